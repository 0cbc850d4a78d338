//! analyze_face - emotion, gaze and posture for one image, as one JSON line
//!
//! Usage: `analyze_face <IMAGE_PATH> <SESSION_ID>`
//!
//! stdout carries exactly one JSON document. Exit status is 1 only when fewer
//! than two arguments are given; everything else, analysis failures included,
//! is reported in-band with status 0. Arguments are never read as flags.
//! Logs go to stderr (`RUST_LOG`).

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use face_analysis::{AnalysisError, AnalysisResponse};

#[derive(Parser, Debug)]
#[command(
    name = "analyze_face",
    about,
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Args {
    /// Image file to analyze (any format the decoder recognizes).
    #[arg(allow_hyphen_values = true)]
    image_path: Option<PathBuf>,
    /// Opaque session identifier, echoed back verbatim.
    #[arg(allow_hyphen_values = true)]
    session_id: Option<OsString>,
    /// Extra arguments are accepted and ignored.
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    rest: Vec<OsString>,
}

impl Args {
    /// Parse with every user argument behind `--`, so none is taken as a flag.
    fn from_argv<I: IntoIterator<Item = OsString>>(argv: I) -> Result<Self, clap::Error> {
        let mut argv = argv.into_iter();
        let program = argv.next().unwrap_or_else(|| OsString::from("analyze_face"));
        let escaped = std::iter::once(program)
            .chain(std::iter::once(OsString::from("--")))
            .chain(argv);
        Args::try_parse_from(escaped)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = match Args::from_argv(std::env::args_os()) {
        Ok(args) => args,
        Err(e) => {
            let message = e.to_string();
            let first_line = message.lines().next().unwrap_or("invalid arguments");
            log::warn!("argument parsing failed: {}", first_line);
            emit(&AnalysisResponse::error(first_line));
            return ExitCode::SUCCESS;
        }
    };

    let (Some(image_path), Some(session_id)) = (args.image_path, args.session_id) else {
        emit(&AnalysisResponse::from(AnalysisError::MissingArguments));
        return ExitCode::FAILURE;
    };
    if !args.rest.is_empty() {
        log::debug!("ignoring {} extra argument(s)", args.rest.len());
    }

    let session_id = session_id.to_string_lossy().into_owned();
    let response = face_analysis::analyze_image(&image_path).with_session(session_id);
    emit(&response);
    ExitCode::SUCCESS
}

fn emit(response: &AnalysisResponse) {
    match response.to_json_line() {
        Ok(line) => println!("{}", line),
        Err(e) => println!("{}", serde_json::json!({ "error": e.to_string() })),
    }
}
