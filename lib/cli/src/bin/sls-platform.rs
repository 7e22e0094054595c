use serverless_platform_cli::cli::platform_main;

fn main() {
    platform_main();
}
