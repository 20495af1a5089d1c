use anyhow::Error;
use qparse_config::ConfigError;
use qparse_core::{CoreError, ParseError, RegistryError};
use std::process::ExitCode;
use thiserror::Error as ThisError;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_INVALID_INPUT: u8 = 3;

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub fn invalid_input(message: impl Into<String>) -> Error {
    CliError::InvalidInput(message.into()).into()
}

pub fn report_error(err: &Error, verbose: bool) {
    let parse_kind = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<ParseError>())
        .map(|parse_err| parse_err.kind().as_str());

    match (parse_kind, verbose) {
        (Some(kind), true) => eprintln!("error: {:#} ({})", err, kind),
        (Some(kind), false) => eprintln!("error: {} ({})", err, kind),
        (None, true) => eprintln!("error: {:#}", err),
        (None, false) => eprintln!("error: {}", err),
    }
}

pub fn exit_code_for(err: &Error) -> ExitCode {
    for cause in err.chain() {
        if let Some(cli_err) = cause.downcast_ref::<CliError>() {
            return ExitCode::from(match cli_err {
                CliError::InvalidInput(_) => EXIT_INVALID_INPUT,
            });
        }
        if let Some(_parse_err) = cause.downcast_ref::<ParseError>() {
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
        if let Some(_registry_err) = cause.downcast_ref::<RegistryError>() {
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return ExitCode::from(config_exit_code(config_err));
        }
        if let Some(_core_err) = cause.downcast_ref::<CoreError>() {
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
    }
    ExitCode::from(EXIT_FAILURE)
}

fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::MissingHomeDir | ConfigError::Read { .. } => EXIT_FAILURE,
        ConfigError::InvalidConfigPath(_)
        | ConfigError::MissingConfigFile(_)
        | ConfigError::EmptyParserName
        | ConfigError::DuplicateParserName(_)
        | ConfigError::InvalidEntitiesPerPage(_)
        | ConfigError::EmptyReturnField
        | ConfigError::Parse { .. } => EXIT_INVALID_INPUT,
    }
}
