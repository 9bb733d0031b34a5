use std::io;
use std::process;
use std::time::Duration;

use fritzmon::{LineRenderer, Result, SoapSource, TrafficMonitor, DEFAULT_HOST, DEFAULT_PORT};

/// Cadence of the reference tool: ten samples per second, smoothed over the
/// last three seconds, one warm-up report from the device's own rates.
const SAMPLE_INTERVAL: Duration = Duration::from_millis(100);
const WINDOW_SIZE: usize = 30;
const IGNORE_INITIAL: u32 = 1;

struct Options {
    host: String,
    port: u16,
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {program} [--host HOST] [--port PORT]\n\
         \n\
         Continuously display WAN throughput of a FRITZ!Box router.\n\
         \n\
         Options:\n\
         \x20 --host HOST   router host name (default: {DEFAULT_HOST})\n\
         \x20 --port PORT   UPnP control port (default: {DEFAULT_PORT})\n\
         \x20 -h, --help    print this help"
    )
}

fn parse_args(args: &[String]) -> std::result::Result<Options, String> {
    let mut options = Options {
        host: DEFAULT_HOST.to_string(),
        port: DEFAULT_PORT,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--host" => {
                options.host = iter
                    .next()
                    .ok_or_else(|| "--host requires a value".to_string())?
                    .clone();
            }
            "--port" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--port requires a value".to_string())?;
                options.port = value
                    .parse()
                    .map_err(|_| format!("invalid port '{value}'"))?;
            }
            "-h" | "--help" => return Err(String::new()),
            other => return Err(format!("unknown argument '{other}'")),
        }
    }

    Ok(options)
}

fn run(options: &Options) -> Result<()> {
    let source = SoapSource::new(&options.host, options.port)?;
    log::info!("monitoring {}", source.endpoint());

    let monitor = TrafficMonitor::new(source)
        .sample_interval(SAMPLE_INTERVAL)
        .window_size(WINDOW_SIZE)
        .ignore_initial(IGNORE_INITIAL);

    let mut renderer = LineRenderer::new(io::stdout());
    for report in monitor.reports() {
        renderer.render(&report?)?;
    }

    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let (program, rest) = match args.split_first() {
        Some((program, rest)) => (program.as_str(), rest),
        None => ("fritzmon", &[][..]),
    };

    let options = match parse_args(rest) {
        Ok(options) => options,
        Err(message) => {
            if message.is_empty() {
                println!("{}", usage(program));
                return;
            }
            eprintln!("{program}: {message}");
            eprintln!("{}", usage(program));
            process::exit(2);
        }
    };

    if let Err(err) = run(&options) {
        // Break out of the rewritten status line before reporting.
        eprintln!();
        log::error!("{err}");
        eprintln!("{program}: {err}");
        process::exit(1);
    }
}
