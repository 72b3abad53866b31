use std::process;

fn main() {
    if let Err(err) = feishu_oauth::run() {
        // Print the main error message
        eprintln!("ERROR: {}", err);

        // If available, print the error chain to provide more context
        let mut source = err.source();
        if source.is_some() {
            eprintln!("\nError details:");
            while let Some(err) = source {
                eprintln!("  - {}", err);
                source = err.source();
            }
        }

        process::exit(feishu_oauth::commands::exit_code(&err));
    }
}
