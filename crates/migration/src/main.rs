use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    if std::env::var("DATABASE_URL").is_err() {
        if let (Ok(user), Ok(password), Ok(host), Ok(port), Ok(name)) = (
            std::env::var("CAPSTONE_DATABASE_USER"),
            std::env::var("CAPSTONE_DATABASE_PASSWORD"),
            std::env::var("CAPSTONE_DATABASE_HOST"),
            std::env::var("CAPSTONE_DATABASE_PORT"),
            std::env::var("CAPSTONE_DATABASE_NAME"),
        ) {
            std::env::set_var(
                "DATABASE_URL",
                format!("postgres://{}:{}@{}:{}/{}", user, password, host, port, name),
            );
        }
    }
    cli::run_cli(migration::Migrator).await;
}
