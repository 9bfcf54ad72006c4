//! Voice commands of the register.
//!
//! Navigation commands are always active. Each page adds its own commands
//! when it is shown; the till page builds one "add" command per product.

use tillpoint_core::Feature;

use super::VoiceCommand;
use crate::actions::PosIntent;
use crate::catalog::{CatalogError, CatalogStore};
use crate::payment::PaymentMethods;

fn navigate(command: &str, feature: Feature, phrases: &[&str]) -> VoiceCommand<PosIntent> {
    VoiceCommand::new(command, PosIntent::Navigate { feature }).with_phrases(phrases.iter().copied())
}

/// Commands available on every page.
#[must_use]
pub fn global_commands() -> Vec<VoiceCommand<PosIntent>> {
    vec![
        navigate("home", Feature::Dashboard, &["home", "go home", "dashboard"]),
        navigate(
            "products",
            Feature::Products,
            &["products", "go to products", "show products"],
        ),
        navigate("orders", Feature::Orders, &["orders", "go to orders", "show orders"]),
        navigate(
            "customers",
            Feature::Customers,
            &["customers", "go to customers", "show customers"],
        ),
        navigate("reports", Feature::Reports, &["reports", "go to reports", "show reports"]),
        navigate("settings", Feature::Settings, &["settings", "open settings"]),
        navigate("users", Feature::Users, &["users", "manage users"]),
        navigate("pos", Feature::Pos, &["pos", "point of sale", "new sale", "open register"]),
        navigate("shop", Feature::Shop, &["shop", "open shop", "storefront"]),
        VoiceCommand::new("logout", PosIntent::Logout).with_phrases(["logout", "log out", "sign out"]),
    ]
}

/// Commands of the till page.
///
/// # Errors
///
/// Returns an error if the product list cannot be read.
pub fn pos_commands(
    catalog: &dyn CatalogStore,
    payment_methods: &PaymentMethods,
) -> Result<Vec<VoiceCommand<PosIntent>>, CatalogError> {
    let mut commands = vec![
        VoiceCommand::new("checkout", PosIntent::BeginCheckout)
            .with_phrases(["checkout", "check out", "pay now"]),
        VoiceCommand::new("confirm payment", PosIntent::ConfirmPayment)
            .with_phrases(["confirm payment", "complete sale"]),
        VoiceCommand::new("cancel checkout", PosIntent::CancelCheckout)
            .with_phrases(["cancel checkout", "cancel payment"]),
        VoiceCommand::new("clear cart", PosIntent::ClearCart)
            .with_phrases(["clear cart", "empty cart"]),
        VoiceCommand::new("hold order", PosIntent::HoldOrder)
            .with_phrases(["hold order", "park sale"]),
    ];

    for method in payment_methods.iter() {
        let label = method.label.to_lowercase();
        commands.push(
            VoiceCommand::new(
                format!("pay with {}", method.id),
                PosIntent::SelectPaymentMethod {
                    method: method.id.clone(),
                },
            )
            .with_phrases([format!("pay with {label}"), format!("pay by {label}")]),
        );
    }

    for product in catalog.list_products()? {
        let name = product.name.to_lowercase();
        commands.push(
            VoiceCommand::new(
                format!("add {name}"),
                PosIntent::AddProduct {
                    product_id: product.id,
                },
            )
            .with_phrases([format!("add {name}"), format!("add {name} to cart")]),
        );
        commands.push(
            VoiceCommand::new(
                format!("remove {name}"),
                PosIntent::RemoveProduct {
                    product_id: product.id,
                },
            )
            .with_phrases([format!("remove {name}"), format!("remove {name} from cart")]),
        );
    }
    Ok(commands)
}

/// Commands for `page`. Pages without voice commands get an empty list.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read.
pub fn page_commands(
    page: Feature,
    catalog: &dyn CatalogStore,
    payment_methods: &PaymentMethods,
) -> Result<Vec<VoiceCommand<PosIntent>>, CatalogError> {
    match page {
        Feature::Pos => pos_commands(catalog, payment_methods),
        Feature::Orders | Feature::Customers => Ok(vec![
            VoiceCommand::new(
                "daily report",
                PosIntent::Navigate {
                    feature: Feature::Reports,
                },
            )
            .with_phrases(["daily report", "show daily report"]),
        ]),
        _ => Ok(Vec::new()),
    }
}
