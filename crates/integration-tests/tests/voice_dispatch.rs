//! Voice command resolution against the register's real command set.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use tillpoint_core::{Feature, ProductId};
use tillpoint_integration_tests::TestContext;
use tillpoint_register::actions::{self, ActionEffect, PosIntent};
use tillpoint_register::checkout::{CheckoutConfig, Register};
use tillpoint_register::documents::HtmlDocumentSink;
use tillpoint_register::payment::{PaymentMethods, SimulatedGateway};
use tillpoint_register::voice::{
    MatchKind, RemoteRecognizer, Scope, SpeechEvent, VoiceCommand, VoiceDispatcher, VoiceListener,
    global_commands, page_commands,
};

fn till_dispatcher(ctx: &TestContext) -> VoiceDispatcher<PosIntent> {
    let mut dispatcher = VoiceDispatcher::new(global_commands());
    let commands =
        page_commands(Feature::Pos, ctx.catalog.as_ref(), &PaymentMethods::default()).unwrap();
    dispatcher.set_page_commands("pos", commands);
    dispatcher
}

#[test]
fn test_exact_phrase_beats_longer_product_name() {
    let ctx = TestContext::new();
    let dispatcher = till_dispatcher(&ctx);

    let found = dispatcher.resolve("Home").unwrap();
    assert_eq!(found.command.command, "home");
    assert_eq!(found.kind, MatchKind::Exact);
    assert_eq!(found.scope, Scope::Global);

    let found = dispatcher.resolve("add home fries").unwrap();
    assert_eq!(
        found.command.action,
        PosIntent::AddProduct {
            product_id: ProductId::new(3)
        }
    );
}

#[test]
fn test_alternate_phrase_resolves_product() {
    let ctx = TestContext::new();
    let dispatcher = till_dispatcher(&ctx);

    let found = dispatcher.resolve("add coffee to cart").unwrap();
    assert_eq!(found.kind, MatchKind::Exact);
    assert_eq!(
        found.command.action,
        PosIntent::AddProduct {
            product_id: ProductId::new(1)
        }
    );
}

#[test]
fn test_page_primary_phrase_inside_sentence() {
    let ctx = TestContext::new();
    let dispatcher = till_dispatcher(&ctx);

    let found = dispatcher.resolve("please add sandwich now").unwrap();
    assert_eq!(found.kind, MatchKind::Containment);
    assert_eq!(found.scope, Scope::Page);
    assert_eq!(
        found.command.action,
        PosIntent::AddProduct {
            product_id: ProductId::new(2)
        }
    );
}

#[test]
fn test_words_are_matched_whole() {
    let dispatcher = VoiceDispatcher::new(vec![
        VoiceCommand::new("products", ()).with_phrases(["show products", "product list"]),
    ]);
    assert!(dispatcher.resolve("show me the products list").is_none());
    assert!(dispatcher.resolve("product list").is_some());
}

#[test]
fn test_unknown_transcript_matches_nothing() {
    let ctx = TestContext::new();
    let dispatcher = till_dispatcher(&ctx);
    assert!(dispatcher.resolve("what time is it").is_none());
    assert!(dispatcher.resolve("   ").is_none());
}

#[tokio::test]
async fn test_spoken_sale() {
    let ctx = TestContext::new();
    let dispatcher = till_dispatcher(&ctx);
    let mut listener = VoiceListener::new(RemoteRecognizer::new(true)).unwrap();
    listener.start().unwrap();

    let mut register = Register::new(
        ctx.catalog.clone(),
        Arc::new(HtmlDocumentSink::default()),
        SimulatedGateway::new(Duration::ZERO),
        CheckoutConfig::default(),
    );

    for utterance in ["add coffee", "add coffee to cart", "checkout", "pay with card", "confirm payment"] {
        assert!(listener.handle(SpeechEvent::Partial(utterance.to_string())).is_none());
        let transcript = listener
            .handle(SpeechEvent::Final(utterance.to_string()))
            .unwrap();
        let intent = dispatcher.resolve(&transcript).unwrap().command.action.clone();
        let effect = actions::apply(&mut register, intent).await.unwrap();
        if utterance == "confirm payment" {
            let ActionEffect::Completed { outcome, .. } = effect else {
                panic!("expected a completed sale");
            };
            assert_eq!(outcome.order.payment_method.to_string(), "card");
            assert_eq!(outcome.order.items.len(), 1);
            assert_eq!(outcome.order.items[0].quantity, 2);
        }
    }
    assert!(register.cart().is_empty());
}
