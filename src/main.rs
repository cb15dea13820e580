use std::process::ExitCode;

#[actix_web::main]
async fn main() -> ExitCode {
    press_review::run().await
}
