//! Storefront - terminal front end

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront::{
    api::ApiClient,
    config::Config,
    models::{NewProduct, Product, ProductImage, ProductUpdate, RegisterInput, TagRef},
    services::{cart_total, decode_claims, rating_summary, search_products, SessionManager},
    storage::create_store,
};

#[derive(Parser)]
#[command(name = "storefront", version, about = "Storefront client")]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "storefront.yml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and remember the session
    Login {
        user_name: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Register(RegisterArgs),
    /// Log out and forget the session
    Logout,
    /// Show the current session
    Whoami,
    /// List every product
    Products,
    /// Search products by name
    Search { query: String },
    /// List products with a tag
    Tag { name: String },
    /// Show one product with its ratings
    Show { id: i64 },
    /// Put a product up for sale
    Create(ProductArgs),
    /// Edit one of your products
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        /// Replace the tag ids
        #[arg(long = "tag")]
        tags: Option<Vec<i64>>,
    },
    /// Delete one of your products
    Delete { id: i64 },
    /// Rate a product from 1 to 5
    Rate {
        id: i64,
        rating: u8,
        #[arg(long)]
        review: Option<String>,
    },
    /// Show the cart
    Cart,
    /// Add a product to the cart
    CartAdd { id: i64 },
    /// Remove a product from the cart
    CartRemove { id: i64 },
}

#[derive(Args)]
struct RegisterArgs {
    #[arg(long)]
    user_name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
}

#[derive(Args)]
struct ProductArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    price: f64,
    /// Tag id (repeatable)
    #[arg(long = "tag")]
    tags: Vec<i64>,
    /// Image URL (repeatable)
    #[arg(long = "image")]
    images: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::load_with_env(&cli.config)?;
    tracing::debug!("Using API at {}", config.api.base_url);

    let store = create_store(&config.storage).await?;
    let api = Arc::new(ApiClient::new(&config.api)?);
    let session = SessionManager::new(store, api.clone());

    session.initialize().await;

    run(cli.command, &session, &api).await
}

async fn run(command: Command, session: &SessionManager, api: &ApiClient) -> Result<()> {
    match command {
        Command::Login {
            user_name,
            password,
        } => {
            if let Some(current) = session.username().await {
                println!("Already logged in as {}", current);
                return Ok(());
            }
            session.authenticate(&user_name, &password).await?;
            println!("Login successful!");
        }
        Command::Register(args) => {
            let input = RegisterInput {
                user_name: args.user_name,
                email: args.email,
                password: args.password,
                first_name: args.first_name,
                last_name: args.last_name,
            };
            let message = api.register(&input).await?;
            println!("{}", message);
        }
        Command::Logout => {
            session.logout().await;
            println!("Logged out");
        }
        Command::Whoami => match session.state().await.token() {
            Some(token) => {
                let username = session.username().await.unwrap_or_default();
                let expires = decode_claims(token)
                    .ok()
                    .and_then(|claims| claims.expires_at())
                    .map(|at| format!(" (token expires {})", at.to_rfc3339()))
                    .unwrap_or_default();
                println!("{}{}", username, expires);
            }
            None => println!("Not logged in"),
        },
        Command::Products => {
            let token = require_session(session).await?;
            for product in api.all_products(&token).await? {
                print_listing(&product);
            }
        }
        Command::Search { query } => {
            let token = require_session(session).await?;
            let products = api.all_products(&token).await?;
            let hits = search_products(&products, &query);
            if hits.is_empty() {
                println!("No products match '{}'", query);
            } else {
                println!("{} result(s) for '{}'", hits.len(), query);
                for hit in hits {
                    println!(
                        "#{:<5} {:<30} {:>10.2}  sold by {}",
                        hit.id, hit.product_name, hit.price, hit.seller_name
                    );
                }
            }
        }
        Command::Tag { name } => {
            let token = require_session(session).await?;
            match api.products_by_tag_name(&token, &name).await? {
                Some(products) if products.is_empty() => {
                    println!("No products tagged '{}'", name)
                }
                Some(products) => {
                    for product in products {
                        print_listing(&product);
                    }
                }
                None => bail!("Tag '{}' does not exist", name),
            }
        }
        Command::Show { id } => {
            let token = require_session(session).await?;
            let product = api.product(&token, id).await?;
            print_product(&product);
        }
        Command::Create(args) => {
            let token = require_session(session).await?;
            let input = NewProduct {
                product_name: args.name,
                product_description: args.description,
                price: args.price,
                tags: args.tags.into_iter().map(TagRef::from).collect(),
                images: args.images.into_iter().map(ProductImage::from).collect(),
            };
            let id = api.create_product(&token, &input).await?;
            println!("Created product #{}", id);
        }
        Command::Edit {
            id,
            name,
            description,
            price,
            tags,
        } => {
            let token = require_session(session).await?;
            let product = owned_product(session, api, &token, id).await?;

            let mut update = ProductUpdate::from_product(&product);
            if let Some(name) = name {
                update.product_name = name;
            }
            if let Some(description) = description {
                update.product_description = description;
            }
            if let Some(price) = price {
                update.price = price;
            }
            if let Some(tags) = tags {
                update.tags = tags.into_iter().map(TagRef::from).collect();
            }

            api.update_product(&token, id, &update).await?;
            println!("Updated product #{}", id);
        }
        Command::Delete { id } => {
            let token = require_session(session).await?;
            owned_product(session, api, &token, id).await?;
            api.delete_product(&token, id).await?;
            println!("Deleted product #{}", id);
        }
        Command::Rate { id, rating, review } => {
            let token = require_session(session).await?;
            api.rate_product(&token, id, rating, review.as_deref())
                .await?;
            println!("Thanks for rating product #{}", id);
        }
        Command::Cart => {
            let token = require_session(session).await?;
            let items = api.cart(&token).await?;
            if items.is_empty() {
                println!("Your cart is empty.");
            } else {
                for item in &items {
                    println!("#{:<5} {:<30} {:>10.2}", item.id, item.product_name, item.price);
                }
                println!("{:<37}{:>10.2}", "Total", cart_total(&items));
            }
        }
        Command::CartAdd { id } => {
            let token = require_session(session).await?;
            api.add_to_cart(&token, id).await?;
            println!("Added product #{} to your cart", id);
        }
        Command::CartRemove { id } => {
            let token = require_session(session).await?;
            api.remove_from_cart(&token, id).await?;
            println!("Removed product #{} from your cart", id);
        }
    }

    Ok(())
}

/// Token of a session the server still accepts
async fn require_session(session: &SessionManager) -> Result<String> {
    if !session.ensure_verified().await {
        bail!("Please log in first");
    }
    session.token().await.context("Please log in first")
}

/// Fetch a product, refusing unless the current user sells it
async fn owned_product(
    session: &SessionManager,
    api: &ApiClient,
    token: &str,
    id: i64,
) -> Result<Product> {
    let product = api.product(token, id).await?;
    let username = session.username().await.unwrap_or_default();
    if !product.is_owned_by(&username) {
        bail!("Product #{} belongs to {}", id, product.user_name);
    }
    Ok(product)
}

fn print_listing(product: &Product) {
    println!(
        "#{:<5} {:<30} {:>10.2}  sold by {}",
        product.id, product.product_name, product.price, product.user_name
    );
}

fn print_product(product: &Product) {
    println!("{} (#{})", product.product_name, product.id);
    println!("Sold by: {}", product.user_name);
    println!("Price: {:.2}", product.price);
    if let Some(created_at) = &product.created_at {
        println!("Created at: {}", created_at);
    }
    if !product.tags.is_empty() {
        let tags: Vec<&str> = product.tags.iter().map(|t| t.tag_name.as_str()).collect();
        println!("Tags: {}", tags.join(", "));
    }
    if let Some(image) = product.thumbnail() {
        println!("Image: {} ({} total)", image, product.images.len());
    }
    println!();
    println!("{}", product.product_description);
    println!();

    match rating_summary(&product.ratings) {
        Some(summary) => {
            println!(
                "Rated {:.1}/5 by {} user(s)",
                summary.average, summary.raters
            );
            for rating in &product.ratings {
                let author = rating.user_name.as_deref().unwrap_or("anonymous");
                match &rating.review_text {
                    Some(text) => println!("  {} - {}: {}", rating.rating, author, text),
                    None => println!("  {} - {}", rating.rating, author),
                }
            }
        }
        None => println!("No ratings yet"),
    }
}
