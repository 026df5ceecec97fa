//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rewear_core::models::{ItemFilters, ItemUpdate, NewItem, ProfileUpdate, SwapMethod};

/// ReWear CLI
#[derive(Parser, Debug)]
#[command(name = "rewear", version)]
#[command(about = "Command-line client for the ReWear clothing-exchange marketplace", long_about = None)]
pub struct Cli {
    /// API base URL (overrides config and REWEAR_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Print raw JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    /// Write logs to the cache directory instead of stderr
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and store the session tokens
    Login {
        /// Account email (defaults to the last one used)
        #[arg(long, env = "REWEAR_EMAIL")]
        email: Option<String>,
    },
    /// Create a new account
    Signup {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// View or edit user profiles
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },
    /// Browse and manage items
    Items {
        #[command(subcommand)]
        command: ItemsCommand,
    },
    /// Swap requests and transactions
    Swaps {
        #[command(subcommand)]
        command: SwapsCommand,
    },
    /// List ratings a user has received
    Ratings { user_id: String },
    /// Rate a user after a transaction
    Rate {
        user_id: String,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: u8,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Upload item images and print their URLs
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Profile, listings and transactions at a glance
    Dashboard,
    /// Check that the API is reachable
    Ping,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Show another user's public profile
    Show { user_id: String },
    /// Update your own profile
    Update(ProfileArgs),
}

#[derive(Args, Debug, Default)]
pub struct ProfileArgs {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub bio: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub phone_number: Option<String>,
}

impl From<ProfileArgs> for ProfileUpdate {
    fn from(args: ProfileArgs) -> Self {
        Self {
            first_name: args.first_name,
            last_name: args.last_name,
            bio: args.bio,
            location: args.location,
            phone_number: args.phone_number,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ItemsCommand {
    /// Browse available items
    List(FilterArgs),
    /// Show an item's details
    Show { item_id: String },
    /// List your own items
    Mine {
        #[arg(long)]
        status: Option<String>,
    },
    /// List a new item
    Create(NewItemArgs),
    /// Edit one of your items
    Update {
        item_id: String,
        #[command(flatten)]
        fields: ItemUpdateArgs,
    },
    /// Remove one of your items
    Delete { item_id: String },
    /// Buy an item with points or money
    Buy {
        item_id: String,
        #[arg(long, conflicts_with = "amount", required_unless_present = "amount")]
        points: Option<i64>,
        #[arg(long)]
        amount: Option<f64>,
    },
}

#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub size: Option<String>,
    #[arg(long)]
    pub condition: Option<String>,
    #[arg(long)]
    pub min_points: Option<i64>,
    #[arg(long)]
    pub max_points: Option<i64>,
    #[arg(long)]
    pub search: Option<String>,
}

impl From<FilterArgs> for ItemFilters {
    fn from(args: FilterArgs) -> Self {
        Self {
            category: args.category,
            size: args.size,
            condition: args.condition,
            min_points: args.min_points,
            max_points: args.max_points,
            search: args.search,
        }
    }
}

#[derive(Args, Debug)]
pub struct NewItemArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: String,
    #[arg(long)]
    pub category: String,
    #[arg(long = "type")]
    pub item_type: String,
    #[arg(long)]
    pub size: String,
    #[arg(long)]
    pub condition: String,
    #[arg(long)]
    pub brand: Option<String>,
    #[arg(long)]
    pub color: Option<String>,
    #[arg(long)]
    pub points: i64,
    /// Comma-separated tags
    #[arg(long)]
    pub tags: Option<String>,
    /// Image URL from `rewear upload`; repeat for more images
    #[arg(long = "image")]
    pub images: Vec<String>,
}

impl From<NewItemArgs> for NewItem {
    fn from(args: NewItemArgs) -> Self {
        Self {
            title: args.title,
            description: args.description,
            category: args.category,
            item_type: args.item_type,
            size: args.size,
            condition: args.condition,
            brand: args.brand,
            color: args.color,
            points_value: args.points,
            tags: args.tags,
            images: args.images,
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct ItemUpdateArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub size: Option<String>,
    #[arg(long)]
    pub condition: Option<String>,
    #[arg(long)]
    pub points: Option<i64>,
    #[arg(long)]
    pub tags: Option<String>,
}

impl From<ItemUpdateArgs> for ItemUpdate {
    fn from(args: ItemUpdateArgs) -> Self {
        Self {
            title: args.title,
            description: args.description,
            size: args.size,
            condition: args.condition,
            points_value: args.points,
            tags: args.tags,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum SwapsCommand {
    /// List your transactions
    List {
        #[arg(long)]
        status: Option<String>,
    },
    /// Show a transaction
    Show { transaction_id: String },
    /// Ask for an item by swap, points or donation
    Request {
        item_id: String,
        #[arg(long, value_enum, default_value_t = MethodArg::Swap)]
        method: MethodArg,
        /// One of your items to offer in exchange
        #[arg(long)]
        offer: Option<String>,
        #[arg(long)]
        message: Option<String>,
        #[arg(long)]
        points: Option<i64>,
    },
    /// Accept a swap request made to you
    Accept { transaction_id: String },
    /// Decline a swap request made to you
    Decline { transaction_id: String },
    /// Mark a transaction as completed
    Complete { transaction_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    Swap,
    Points,
    Donation,
}

impl From<MethodArg> for SwapMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Swap => SwapMethod::Swap,
            MethodArg::Points => SwapMethod::Points,
            MethodArg::Donation => SwapMethod::Donation,
        }
    }
}
