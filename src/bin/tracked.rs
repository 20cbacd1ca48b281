use std::env;
use std::error::Error;
use std::fs::File;
use std::process;
use getopts::{Matches, Options};
use log::{LevelFilter, Log, Metadata, Record};
use tracked::format::s3m::InstrumentKind;
use tracked::module::Module;

struct StderrLogger {
    level: LevelFilter,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

fn init_logger(verbosity: usize) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let logger: &'static StderrLogger = Box::leak(Box::new(StderrLogger{ level }));
    if log::set_logger(logger).is_ok() {
        log::set_max_level(level);
    }
}

fn main() {

    let args: Vec<String> = env::args().collect();
    let mut opts = Options::new();

    opts.optflag("h", "help", "display usage information and exit");
    opts.optopt("p", "pattern", "show the contents of pattern NUM", "NUM");
    opts.optflag("s", "samples", "list instruments and samples");
    opts.optflagmulti("v", "verbose", "increase log verbosity");

    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(2);
        }
    };

    if matches.opt_present("h") || matches.free.is_empty() {
        let brief = format!("Usage: {} [options] filename", args[0]);
        print!("{}", opts.usage(&brief));
        return;
    }

    init_logger(matches.opt_count("v"));

    if let Err(e) = run(&matches) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn parse_num(s: &str) -> Result<usize, Box<dyn Error>> {
    let n = if let Some(hex) = s.strip_prefix("0x") {
        usize::from_str_radix(hex, 16)?
    } else {
        s.parse()?
    };
    Ok(n)
}

fn run(matches: &Matches) -> Result<(), Box<dyn Error>> {
    let name = &matches.free[0];
    let file = File::open(name)?;
    let module = tracked::load_from(file)?;

    println!("Format   : {}", module.format());
    println!("Title    : {}", module.title());
    println!("Channels : {}", module.channels());
    println!("Length   : {}", module.orders().len());
    println!("Patterns : {}", module.num_patterns());

    if matches.opt_present("s") {
        show_samples(&module);
    }

    if let Some(p) = matches.opt_str("p") {
        let num = parse_num(&p)?;
        if num >= module.num_patterns() {
            return Err(format!("pattern {} out of range", num).into());
        }
        show_pattern(&module, num);
    }

    Ok(())
}

fn show_samples(module: &Module) {
    match module {
        Module::It(m) => {
            println!("Instruments:");
            for (i, ins) in m.instruments.iter().enumerate() {
                println!("{:3}: {:26} fadeout {:5}", i + 1, ins.name(), ins.fadeout());
            }
            println!("Samples:");
            for (i, smp) in m.samples.iter().enumerate() {
                println!("{:3}: {:26} {:7} {:7} {:7} {}{}{}",
                    i + 1, smp.name, smp.length, smp.loop_begin, smp.loop_end,
                    if smp.has_loop() { 'L' } else { ' ' },
                    if smp.is_16bit() { 'W' } else { ' ' },
                    if smp.is_compressed() { 'C' } else { ' ' });
            }
        }
        Module::Mod(m) => {
            println!("Instruments:");
            for (i, ins) in m.instruments.iter().enumerate() {
                println!("{:3}: {:22} {:6} {:6} {:6} {}",
                    i + 1, ins.name, ins.length(), ins.loop_start as usize * 2,
                    ins.loop_length as usize * 2, if ins.has_loop() { 'L' } else { ' ' });
            }
        }
        Module::S3m(m) => {
            println!("Instruments:");
            for (i, ins) in m.instruments.iter().enumerate() {
                let kind = match &ins.kind {
                    InstrumentKind::None          => "-".to_owned(),
                    InstrumentKind::Digiplayer(s) => format!("PCM {} bytes", s.data.len()),
                    InstrumentKind::Opl2{ .. }    => "OPL2".to_owned(),
                };
                println!("{:3}: {:28} {}", i + 1, ins.name, kind);
            }
        }
        Module::Xm(m) => {
            println!("Instruments:");
            for (i, ins) in m.instruments.iter().enumerate() {
                println!("{:3}: {:22} {:2} samples", i + 1, ins.header.name(), ins.samples.len());
                for smp in &ins.samples {
                    println!("       {:22} {:7}{}", smp.name, smp.data.len(),
                        if smp.is_16bit() { " 16-bit" } else { "" });
                }
            }
        }
    }
}

fn show_pattern(module: &Module, num: usize) {
    println!("Pattern {}:", num);
    let rows = module.pattern_events(num).unwrap_or_default();
    for (r, row) in rows.iter().enumerate() {
        print!("{:3}: ", r);
        for e in row.iter().take(module.channels()) {
            print!("{}  ", e);
        }
        println!();
    }
}
