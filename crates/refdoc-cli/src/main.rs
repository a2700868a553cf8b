use std::process;

fn main() {
    match refdoc_cli::run() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("refdoc error: {err:#}");
            process::exit(1);
        }
    }
}
