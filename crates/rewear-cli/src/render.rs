//! Text and JSON rendering of API results.

use std::fmt::Write as _;

use anyhow::Result;
use rewear_core::models::{Item, Page, RatingsPage, Transaction, UploadedImage, User};
use serde::Serialize;

use crate::format::{format_date, format_optional, format_points, format_rating, truncate_string};

const TITLE_WIDTH: usize = 32;

/// Where command results go: formatted text, or the raw models as JSON.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print `value` as pretty JSON, or the text produced by `text`.
    pub fn emit<T, F>(&self, value: &T, text: F) -> Result<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&T) -> String,
    {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text(value).trim_end());
        }
        Ok(())
    }

    pub fn message(&self, message: &str) -> Result<()> {
        self.emit(&serde_json::json!({ "message": message }), |_| {
            message.to_string()
        })
    }
}

pub fn user(user: &User) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", user.display_name());
    if let Some(email) = &user.email {
        let _ = writeln!(out, "  Email:     {}", email);
    }
    let _ = writeln!(out, "  Location:  {}", format_optional(&user.location, "-"));
    let _ = writeln!(out, "  Points:    {}", format_points(user.points_balance));
    let _ = writeln!(out, "  Rating:    {}", format_rating(user.average_rating));
    let _ = writeln!(
        out,
        "  Swaps:     {} total, {} completed, {} ongoing",
        user.total_swaps, user.completed_swaps, user.ongoing_swaps
    );
    let _ = writeln!(out, "  Listed:    {} items", user.items_listed);
    let _ = writeln!(out, "  Joined:    {}", format_date(user.created_at.as_ref()));
    if let Some(bio) = user.bio.as_deref().filter(|b| !b.trim().is_empty()) {
        let _ = writeln!(out, "\n{}", bio);
    }
    out
}

fn item_row(item: &Item) -> String {
    format!(
        "{:<10} {:<width$} {:<6} {:<10} {:>10}  {}",
        truncate_string(&item.item_id, 10),
        truncate_string(&item.title, TITLE_WIDTH),
        format_optional(&item.size, "-"),
        format_optional(&item.condition, "-"),
        format_points(item.points_value),
        format_optional(&item.status, "-"),
        width = TITLE_WIDTH,
    )
}

pub fn items(page: &Page<Item>) -> String {
    if page.is_empty() {
        return "No items found.".to_string();
    }
    let mut out = String::new();
    for item in &page.results {
        let _ = writeln!(out, "{}", item_row(item));
    }
    let _ = writeln!(out, "\n{} item(s)", page.count.max(page.results.len() as u64));
    out
}

pub fn item(item: &Item) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} [{}]", item.title, item.item_id);
    let _ = writeln!(out, "  Category:  {}", format_optional(&item.category, "-"));
    let _ = writeln!(out, "  Type:      {}", format_optional(&item.item_type, "-"));
    let _ = writeln!(out, "  Size:      {}", format_optional(&item.size, "-"));
    let _ = writeln!(out, "  Condition: {}", format_optional(&item.condition, "-"));
    if let Some(brand) = &item.brand {
        let _ = writeln!(out, "  Brand:     {}", brand);
    }
    let _ = writeln!(out, "  Points:    {}", format_points(item.points_value));
    let _ = writeln!(out, "  Status:    {}", format_optional(&item.status, "-"));
    if let Some(uploader) = &item.uploader {
        let _ = writeln!(out, "  Listed by: {}", uploader.display_name());
    }
    if !item.tag_list.is_empty() {
        let _ = writeln!(out, "  Tags:      {}", item.tag_list.join(", "));
    }
    if let Some(cover) = item.cover_image() {
        let _ = writeln!(out, "  Image:     {}", cover);
    }
    if let Some(description) = item.description.as_deref().filter(|d| !d.trim().is_empty()) {
        let _ = writeln!(out, "\n{}", description);
    }
    out
}

fn transaction_row(tx: &Transaction) -> String {
    let title = tx
        .their_item
        .as_ref()
        .or(tx.my_item.as_ref())
        .map(|i| i.title.as_str())
        .unwrap_or("-");
    format!(
        "{:<10} {:<9} {:<10} {:<width$} {:<20} {}",
        truncate_string(&tx.transaction_id, 10),
        tx.method,
        tx.status,
        truncate_string(title, TITLE_WIDTH),
        truncate_string(&tx.partner_name(), 20),
        format_date(tx.created_at.as_ref()),
        width = TITLE_WIDTH,
    )
}

pub fn transactions(page: &Page<Transaction>) -> String {
    if page.is_empty() {
        return "No transactions found.".to_string();
    }
    let mut out = String::new();
    for tx in &page.results {
        let _ = writeln!(out, "{}", transaction_row(tx));
    }
    out
}

pub fn transaction(tx: &Transaction) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Transaction {} ({}, {})", tx.transaction_id, tx.method, tx.status);
    let _ = writeln!(out, "  With:      {}", tx.partner_name());
    if let Some(item) = &tx.their_item {
        let _ = writeln!(out, "  Their item: {}", item.title);
    }
    if let Some(item) = &tx.my_item {
        let _ = writeln!(out, "  My item:   {}", item.title);
    }
    if tx.points_amount > 0 {
        let _ = writeln!(out, "  Points:    {}", format_points(tx.points_amount));
    }
    let _ = writeln!(out, "  Created:   {}", format_date(tx.created_at.as_ref()));
    out
}

pub fn ratings(page: &RatingsPage) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} rating(s), average {}",
        page.count,
        format_rating(page.average_rating)
    );
    for rating in &page.results {
        let rater = rating
            .rater
            .as_ref()
            .map(|u| u.display_name())
            .unwrap_or_else(|| "Anonymous".to_string());
        let _ = write!(out, "  {} {}", rating.stars(), rater);
        match rating.comment.as_deref().filter(|c| !c.trim().is_empty()) {
            Some(comment) => {
                let _ = writeln!(out, ": {}", comment);
            }
            None => {
                let _ = writeln!(out);
            }
        }
    }
    out
}

pub fn uploaded(images: &[UploadedImage]) -> String {
    images
        .iter()
        .map(|img| img.url.clone())
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub user: User,
    pub items: Page<Item>,
    pub transactions: Page<Transaction>,
}

pub fn dashboard(dash: &Dashboard) -> String {
    let pending = dash
        .transactions
        .results
        .iter()
        .filter(|tx| tx.is_pending())
        .count();
    let available = dash.items.results.iter().filter(|i| i.is_available()).count();

    let mut out = user(&dash.user);
    let _ = writeln!(
        out,
        "\nMy items ({} listed, {} available)",
        dash.items.results.len(),
        available
    );
    for item in &dash.items.results {
        let _ = writeln!(out, "  {}", item_row(item));
    }
    let _ = writeln!(out, "\nTransactions ({} pending)", pending);
    for tx in &dash.transactions.results {
        let _ = writeln!(out, "  {}", transaction_row(tx));
    }
    out
}
