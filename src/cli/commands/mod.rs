pub mod auth;
pub mod logging;
pub mod quiz;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_PORT: &str = "port";
pub const ARG_DSN: &str = "dsn";
pub const ARG_PUBLIC_DIR: &str = "public-dir";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("bananaquiz")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("3000")
                .env("QUIZ_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long(ARG_DSN)
                .help("Database connection string")
                .env("QUIZ_DSN")
                .required(true),
        )
        .arg(
            Arg::new(ARG_PUBLIC_DIR)
                .long(ARG_PUBLIC_DIR)
                .help("Directory holding the HTML pages and static assets")
                .env("QUIZ_PUBLIC_DIR")
                .default_value("public"),
        );

    let command = auth::with_args(command);
    let command = quiz::with_args(command);
    logging::with_args(command)
}
