use clap::builder::NonEmptyStringValueParser;
use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about, version, name = "sparql-mediator")]
/// SPARQL endpoint that answers queries with the knowledge of a knowledge network
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the SPARQL Mediator HTTP server
    Serve {
        /// Host and port to listen to
        #[arg(short, long, default_value = "localhost:8000", value_hint = ValueHint::Hostname)]
        bind: String,
        /// Allows cross-origin requests
        #[arg(long)]
        cors: bool,
        /// Base URL of the REST API of the knowledge engine runtime
        #[arg(
            long,
            env = "KNOWLEDGE_ENGINE_URL",
            value_parser = NonEmptyStringValueParser::new(),
            value_hint = ValueHint::Url
        )]
        knowledge_engine_url: String,
        /// Prefix of the knowledge base identifiers
        ///
        /// The knowledge base of a requester is identified by this prefix followed by the requester.
        #[arg(
            long,
            env = "KNOWLEDGE_BASE_ID_PREFIX",
            value_parser = NonEmptyStringValueParser::new(),
            value_hint = ValueHint::Url
        )]
        knowledge_base_id_prefix: String,
        /// JSON file that maps secret tokens to requesters
        ///
        /// If no file is given, tokens are disabled and all requests are answered on behalf of a
        /// single requester.
        #[arg(long, env = "TOKENS_FILE_PATH", value_hint = ValueHint::FilePath)]
        tokens_file: Option<PathBuf>,
        /// Name under which the endpoint presents itself
        #[arg(long, env = "SPARQL_ENDPOINT_NAME", default_value = "Knowledge Engine")]
        endpoint_name: String,
        /// Timeout in seconds for requests to the knowledge engine
        #[arg(long, default_value_t = 60)]
        request_timeout: u64,
    },
}
