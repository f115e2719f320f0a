use clap::{Args, Subcommand};

use rouge::prelude::*;
use rouge_app::context::AppContext;

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Print the active cart
    Show,
    Add(AddArgs),
    Update(UpdateArgs),
    Remove(RemoveArgs),
    /// Empty the cart once an order has been placed
    Checkout,
}

/// Add a variant to the cart
#[derive(Debug, Args)]
struct AddArgs {
    /// Variant SKU
    sku: String,

    /// Number of units
    quantity: u32,

    /// Unit price
    #[arg(long)]
    price: String,

    /// Display name
    #[arg(long)]
    name: Option<String>,
}

/// Set a line's quantity; zero or less removes it
#[derive(Debug, Args)]
struct UpdateArgs {
    /// Line id, as printed by `cart show`
    id: String,

    /// New quantity
    #[arg(allow_negative_numbers = true)]
    quantity: i64,
}

/// Remove a line
#[derive(Debug, Args)]
struct RemoveArgs {
    /// Line id, as printed by `cart show`
    id: String,
}

pub(crate) async fn run(context: &AppContext, command: CartCommand) -> Result<(), String> {
    context
        .resume()
        .await
        .map_err(|error| format!("failed to read session: {error}"))?;

    let carts = &context.carts;

    let cart = match command.command {
        CartSubcommand::Show => carts.cart().await,
        CartSubcommand::Add(args) => carts.add_item(new_item(args)?).await,
        CartSubcommand::Update(args) => {
            carts
                .update_item(&ItemId::new(args.id), args.quantity)
                .await
        }
        CartSubcommand::Remove(args) => carts.remove_item(&ItemId::new(args.id)).await,
        CartSubcommand::Checkout => {
            carts
                .clear()
                .await
                .map_err(|error| format!("checkout failed: {error}"))?;

            println!("cart emptied");

            return Ok(());
        }
    }
    .map_err(|error| error.to_string())?;

    print_cart(&cart);

    Ok(())
}

fn new_item(args: AddArgs) -> Result<NewCartItem, String> {
    Ok(NewCartItem {
        sku: Sku::new(&args.sku).map_err(|error| error.to_string())?,
        quantity: Quantity::new(args.quantity).map_err(|error| error.to_string())?,
        price: Price::parse(&args.price).map_err(|error| error.to_string())?,
        name: args.name,
    })
}

fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("cart is empty");

        return;
    }

    for item in cart.items() {
        println!(
            "{}  {}  {} x {} = {}{}",
            item.id(),
            item.sku(),
            item.quantity(),
            item.price(),
            item.subtotal(),
            item.name().map(|name| format!("  ({name})")).unwrap_or_default()
        );
    }

    println!("items: {}", cart.item_count());
    println!("total: {}", cart.total());
}
