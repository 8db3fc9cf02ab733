use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "examdesk", version, about = "Timed exam portal for PDF question banks")]
pub struct Cli {
    /// PDF to extract questions from (prompted for when omitted)
    pub pdf: Option<String>,

    /// Override the extracted time limit, in minutes
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub minutes: Option<u64>,

    /// Do not read or write the extraction cache
    #[arg(long)]
    pub no_cache: bool,

    /// Delete cached extractions and exit
    #[arg(long)]
    pub clear_cache: bool,

    /// Write the report here on completion (.yaml, .yml or .json)
    #[arg(long, value_name = "path")]
    pub export: Option<String>,

    /// Log file [default: <data dir>/examdesk.log]
    #[arg(long, value_name = "path")]
    pub log_file: Option<String>,
}
