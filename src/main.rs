use std::env;

mod app;
mod audio;
mod catalog;
mod config;
mod logging;
mod mpris;
mod runtime;
mod theme;
mod ui;

#[cfg(test)]
mod test_support;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    match env::args().nth(1).as_deref() {
        Some("--dump-config") => {
            let (settings, problem) = runtime::load_settings();
            if let Some(msg) = problem {
                eprintln!("cadenza: {msg}");
            }
            print!("{}", settings.to_toml()?);
            Ok(())
        }
        Some("--version") | Some("-V") => {
            println!("cadenza {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(other) => Err(format!("unknown argument: {other}").into()),
        None => runtime::run(),
    }
}
