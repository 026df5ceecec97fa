//! Command coordinator.
//!
//! `App` owns the session and turns parsed commands into API calls. Every
//! API result passes through `SessionStore::guard`, so a 401 on an
//! authenticated request clears the session before the error is reported.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use rewear_core::models::{
    ImageUpload, ItemFilters, ProfileUpdate, PurchaseRequest, SignupRequest, SwapAction,
    SwapRequest,
};
use rewear_core::{ApiClient, ApiError, ApiResult, Config, SessionStore};
use tracing::{debug, info, warn};

use crate::cli::{Command, ItemsCommand, ProfileCommand, SwapsCommand};
use crate::render::{self, Dashboard, Output};

/// Environment variable consulted before prompting for a password
const PASSWORD_ENV: &str = "REWEAR_PASSWORD";

const LOGIN_HINT: &str = "Run `rewear login` to sign in.";

pub struct App {
    config: Config,
    session: SessionStore,
    output: Output,
}

impl App {
    pub fn new(config: Config, api_url: Option<String>, json: bool) -> Result<Self> {
        let tokens = config
            .token_store()
            .context("Failed to open token storage")?;
        let base_url = api_url.unwrap_or_else(|| config.api_base_url());
        debug!(base_url = %base_url, backend = ?config.token_backend, "Creating API client");
        let api = ApiClient::with_timeout(base_url, tokens, config.request_timeout())?;

        Ok(Self {
            config,
            session: SessionStore::new(api),
            output: Output::new(json),
        })
    }

    fn api(&self) -> &ApiClient {
        self.session.api()
    }

    /// Route an API result through the session guard.
    fn checked<T>(&self, result: ApiResult<T>) -> Result<T> {
        match self.session.guard(result) {
            Ok(value) => Ok(value),
            Err(ApiError::SessionExpired { .. }) => {
                bail!("Your session has expired. {}", LOGIN_HINT)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn require_login(&self) -> Result<()> {
        if !self.session.has_stored_token() {
            bail!("Not logged in. {}", LOGIN_HINT);
        }
        Ok(())
    }

    pub async fn run(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Login { email } => self.login(email).await,
            Command::Signup {
                first_name,
                last_name,
                email,
            } => self.signup(first_name, last_name, email).await,
            Command::Logout => {
                self.session.logout();
                self.output.message("Logged out.")
            }
            Command::Whoami => self.whoami().await,
            Command::Profile { command } => self.profile(command).await,
            Command::Items { command } => self.items(command).await,
            Command::Swaps { command } => self.swaps(command).await,
            Command::Ratings { user_id } => {
                let page = self.checked(self.api().user_ratings(&user_id).await)?;
                self.output.emit(&page, render::ratings)
            }
            Command::Rate {
                user_id,
                rating,
                comment,
            } => {
                self.require_login()?;
                let rating = self.checked(
                    self.api()
                        .rate_user(&user_id, rating, comment.as_deref())
                        .await,
                )?;
                self.output.emit(&rating, |r| format!("Rated {}", r.stars()))
            }
            Command::Upload { files } => self.upload(files).await,
            Command::Dashboard => self.dashboard().await,
            Command::Ping => {
                let root = self.checked(self.api().api_root().await)?;
                let base_url = self.api().base_url().to_string();
                self.output
                    .emit(&root, |_| format!("{} is reachable", base_url))
            }
        }
    }

    async fn login(&mut self, email: Option<String>) -> Result<()> {
        let email = match email.or_else(|| self.config.last_email.clone()) {
            Some(email) => email,
            None => prompt_line("Email: ")?,
        };
        if email.is_empty() {
            bail!("Email is required");
        }
        let password = read_password("Password: ")?;

        let user = self.checked(self.session.login(&email, &password).await)?;

        if self.config.last_email.as_deref() != Some(email.as_str()) {
            self.config.last_email = Some(email);
            if let Err(e) = self.config.save() {
                warn!(error = %e, "Failed to save config");
            }
        }

        self.output.emit(&user, |u| {
            format!(
                "Logged in as {} ({})",
                u.display_name(),
                crate::format::format_points(u.points_balance)
            )
        })
    }

    async fn signup(&self, first_name: String, last_name: String, email: String) -> Result<()> {
        let password = read_password("Password: ")?;
        let confirm = match std::env::var(PASSWORD_ENV) {
            Ok(_) => None,
            Err(_) => Some(rpassword::prompt_password("Confirm password: ")?),
        };

        let request = SignupRequest::new(first_name, last_name, email, password, confirm);
        let response = self.checked(self.api().signup(&request).await)?;
        info!(email = %request.email, "Account created");

        let message = response
            .message
            .unwrap_or_else(|| "Account created.".to_string());
        self.output.message(&format!("{} {}", message, LOGIN_HINT))
    }

    async fn whoami(&self) -> Result<()> {
        let snapshot = self.session.init().await;
        match snapshot.user {
            Some(user) => self.output.emit(&user, render::user),
            None => bail!("Not logged in. {}", LOGIN_HINT),
        }
    }

    async fn profile(&self, command: ProfileCommand) -> Result<()> {
        match command {
            ProfileCommand::Show { user_id } => {
                let user = self.checked(self.api().public_profile(&user_id).await)?;
                self.output.emit(&user, render::user)
            }
            ProfileCommand::Update(args) => {
                self.require_login()?;
                let update = ProfileUpdate::from(args);
                if update.is_empty() {
                    bail!("Nothing to update");
                }
                let user = self.checked(self.api().update_profile(&update).await)?;
                self.output.emit(&user, render::user)
            }
        }
    }

    async fn items(&self, command: ItemsCommand) -> Result<()> {
        match command {
            ItemsCommand::List(args) => {
                let filters = ItemFilters::from(args);
                let page = self.checked(self.api().list_items(&filters).await)?;
                self.output.emit(&page, render::items)
            }
            ItemsCommand::Show { item_id } => {
                let item = self.checked(self.api().item(&item_id).await)?;
                self.output.emit(&item, render::item)
            }
            ItemsCommand::Mine { status } => {
                self.require_login()?;
                let page = self.checked(self.api().my_items(status.as_deref()).await)?;
                self.output.emit(&page, render::items)
            }
            ItemsCommand::Create(args) => {
                self.require_login()?;
                let item = self.checked(self.api().create_item(&args.into()).await)?;
                self.output.emit(&item, render::item)
            }
            ItemsCommand::Update { item_id, fields } => {
                self.require_login()?;
                let item = self.checked(self.api().update_item(&item_id, &fields.into()).await)?;
                self.output.emit(&item, render::item)
            }
            ItemsCommand::Delete { item_id } => {
                self.require_login()?;
                let response = self.checked(self.api().delete_item(&item_id).await)?;
                self.output.message(response.message_or("Item deleted."))
            }
            ItemsCommand::Buy {
                item_id,
                points,
                amount,
            } => {
                self.require_login()?;
                let purchase = match (points, amount) {
                    (Some(points), _) => PurchaseRequest::points(points),
                    (None, Some(amount)) => PurchaseRequest::currency(amount),
                    (None, None) => bail!("Either --points or --amount is required"),
                };
                let response = self.checked(self.api().purchase_item(&item_id, &purchase).await)?;
                self.output.emit(&response, |r| {
                    r.message
                        .clone()
                        .unwrap_or_else(|| "Purchase complete.".to_string())
                })
            }
        }
    }

    async fn swaps(&self, command: SwapsCommand) -> Result<()> {
        self.require_login()?;
        let action = match command {
            SwapsCommand::List { status } => {
                let page = self.checked(self.api().list_swaps(status.as_deref()).await)?;
                return self.output.emit(&page, render::transactions);
            }
            SwapsCommand::Show { transaction_id } => {
                let tx = self.checked(self.api().swap(&transaction_id).await)?;
                return self.output.emit(&tx, render::transaction);
            }
            SwapsCommand::Request {
                item_id,
                method,
                offer,
                message,
                points,
            } => {
                let request = SwapRequest {
                    requested_item_id: item_id,
                    offered_item_id: offer,
                    method: method.into(),
                    message,
                    points_amount: points,
                };
                let tx = self.checked(self.api().create_swap(&request).await)?;
                return self.output.emit(&tx, render::transaction);
            }
            SwapsCommand::Accept { transaction_id } => (transaction_id, SwapAction::Accept),
            SwapsCommand::Decline { transaction_id } => (transaction_id, SwapAction::Decline),
            SwapsCommand::Complete { transaction_id } => (transaction_id, SwapAction::Complete),
        };

        let (transaction_id, action) = action;
        let response = self.checked(self.api().update_swap(&transaction_id, action).await)?;
        let fallback = format!("Transaction {} updated ({}).", transaction_id, action);
        self.output.message(response.message_or(&fallback))
    }

    async fn upload(&self, files: Vec<PathBuf>) -> Result<()> {
        self.require_login()?;
        let images = files
            .iter()
            .map(|path| ImageUpload::from_path(path))
            .collect::<Result<Vec<_>>>()?;
        let uploaded = self.checked(self.api().upload_images(images).await)?;
        self.output.emit(uploaded.as_slice(), render::uploaded)
    }

    /// Profile, own items and transactions, fetched concurrently.
    async fn dashboard(&self) -> Result<()> {
        self.require_login()?;
        let api = self.api();
        let (user, items, transactions) = self.checked(
            futures::try_join!(api.current_user(), api.my_items(None), api.list_swaps(None)),
        )?;
        let dashboard = Dashboard {
            user,
            items,
            transactions,
        };
        self.output.emit(&dashboard, render::dashboard)
    }
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn read_password(prompt: &str) -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }
    Ok(rpassword::prompt_password(prompt)?)
}
