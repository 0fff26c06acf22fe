use dice_tree::{Mode, RResult, RollContext};
use std::io::{self, BufRead, Write};

const USAGE: &str = "usage: repl [-a | -c | -m] [-v] [-n N] [EXPR...]";

struct Options {
    mode: Mode,
    verbose: bool,
    times: usize,
    exprs: Vec<String>,
}

fn set_mode(mode: Mode, opts: &mut Options) -> Result<(), String> {
    if !opts.mode.is_normal() {
        return Err("-a, -c and -m are mutually exclusive".to_owned());
    }
    opts.mode = mode;
    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options, String> {
    let mut opts = Options {
        mode: Mode::NORMAL,
        verbose: false,
        times: 1,
        exprs: Vec::new(),
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-a" | "--average" => set_mode(Mode::AVERAGE, &mut opts)?,
            "-c" | "--critical" => set_mode(Mode::CRIT, &mut opts)?,
            "-m" | "--maximum" => set_mode(Mode::MAX, &mut opts)?,
            "-v" | "--verbose" => opts.verbose = true,
            "-n" | "--number" => {
                opts.times = args
                    .next()
                    .and_then(|n| n.parse().ok())
                    .ok_or_else(|| format!("{} expects a count", arg))?;
            }
            "-h" | "--help" => return Err(USAGE.to_owned()),
            _ => opts.exprs.push(arg),
        }
    }
    Ok(opts)
}

fn run(expr: &str, opts: &Options, ctx: &mut RollContext) -> RResult<()> {
    for _ in 0..opts.times {
        if opts.verbose {
            println!("{}", dice_tree::verbose_with(expr, opts.mode, 0, ctx)?);
        } else {
            println!("{}", dice_tree::basic_with(expr, opts.mode, 0, ctx)?);
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let opts = match parse_args(std::env::args().skip(1)) {
        Ok(opts) => opts,
        Err(why) => {
            eprintln!("{}", why);
            std::process::exit(2);
        }
    };
    let mut ctx = RollContext::default();

    if !opts.exprs.is_empty() {
        for expr in &opts.exprs {
            if let Err(why) = run(expr, &opts, &mut ctx) {
                eprintln!("Error: {}", why);
            }
        }
        return Ok(());
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    print!("> ");
    io::stdout().flush()?;
    while let Some(Ok(line)) = lines.next() {
        let line = line.trim();
        if !line.is_empty() {
            if let Err(why) = run(line, &opts, &mut ctx) {
                eprintln!("Error: {}", why);
            }
        }
        print!("> ");
        io::stdout().flush()?;
    }
    Ok(())
}
