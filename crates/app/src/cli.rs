//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use linkhub_domain::{AiProvider, ExportFormat, MemberRole};

#[derive(Parser, Debug)]
#[command(author, version, about = "Command-line client for the Linkhub dashboard API")]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long, short, env = "LINKHUB_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// File holding the session tokens.
    #[arg(long, env = "LINKHUB_SESSION_FILE", global = true)]
    pub session_file: Option<PathBuf>,

    /// Server origin, overriding the configuration.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Log every request and response.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in with email and password.
    Login {
        email: String,
        #[arg(long, env = "LINKHUB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and log in.
    Register {
        username: String,
        email: String,
        #[arg(long, env = "LINKHUB_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Log in with a texted verification code.
    PhoneLogin { phone: String, code: String },
    /// Text a verification code to a phone number.
    SendCode { phone: String },
    /// Start the password reset flow.
    ResetPassword { email: String },
    /// End the session.
    Logout,
    /// Show the logged-in account.
    Whoami,
    /// Show the state of the stored tokens.
    Status,
    /// Renew the access token now.
    Refresh,
    /// Parse a link and save it to a group.
    Parse {
        url: String,
        #[arg(long, default_value_t = 1)]
        group: i64,
        /// Ask for AI enhancement.
        #[arg(long)]
        ai: bool,
        /// AI backend to use with --ai.
        #[arg(long, value_enum, requires = "ai")]
        provider: Option<ProviderArg>,
    },
    /// Saved contents.
    Contents {
        #[command(subcommand)]
        action: ContentsCommand,
    },
    /// Groups.
    Groups {
        #[command(subcommand)]
        action: GroupsCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ContentsCommand {
    /// List contents.
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        page_size: u32,
        #[arg(long)]
        search: Option<String>,
        /// Comma-separated platforms.
        #[arg(long, value_delimiter = ',')]
        platform: Vec<String>,
        #[arg(long)]
        group: Option<i64>,
    },
    /// Show one content item.
    Get { id: i64 },
    /// Delete a content item.
    Delete { id: i64 },
    /// Show aggregate counters.
    Stats {
        #[arg(long)]
        group: Option<i64>,
    },
    /// Download contents as a file.
    Export {
        #[arg(long, value_enum, default_value_t = FormatArg::Json)]
        format: FormatArg,
        /// Destination; stdout when omitted.
        #[arg(long, short)]
        output: Option<PathBuf>,
        #[arg(long)]
        group: Option<i64>,
    },
}

#[derive(Subcommand, Debug)]
pub enum GroupsCommand {
    /// List groups.
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        page_size: u32,
    },
    /// Show one group.
    Get { id: i64 },
    /// Create a group.
    Create {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        private: bool,
    },
    /// Delete a group.
    Delete { id: i64 },
    /// Invite people by email.
    Invite {
        id: i64,
        #[arg(required = true)]
        emails: Vec<String>,
        #[arg(long, value_enum)]
        role: Option<RoleArg>,
        #[arg(long)]
        message: Option<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ProviderArg {
    Baidu,
    Alibaba,
    Tencent,
}

impl From<ProviderArg> for AiProvider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Baidu => Self::Baidu,
            ProviderArg::Alibaba => Self::Alibaba,
            ProviderArg::Tencent => Self::Tencent,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Json,
    Csv,
    Excel,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => Self::Json,
            FormatArg::Csv => Self::Csv,
            FormatArg::Excel => Self::Excel,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum RoleArg {
    Admin,
    Member,
    Viewer,
}

impl From<RoleArg> for MemberRole {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Admin => Self::Admin,
            RoleArg::Member => Self::Member,
            RoleArg::Viewer => Self::Viewer,
        }
    }
}
