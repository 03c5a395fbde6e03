use std::process;

fn main() {
    match pipsite_server::run() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("pipsite error: {err:#}");
            process::exit(1);
        }
    }
}
