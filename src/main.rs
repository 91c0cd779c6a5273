use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let code = ionic_cli::run(args, std::env::vars().collect()).await;
    ExitCode::from(code)
}
