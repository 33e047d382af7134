//! Declarations collected at link time through `inventory`.
#![cfg(feature = "inventory")]

use interpose::{
    DeclarationSubmission, DeclarationTarget, DeclaredPolicy, HandlerDeclaration, Interception,
    PolicySet, testing::CountingHandler,
};
use lazy_static::lazy_static;

mod common;
use common::{Wrappable, WrappableContract, WrappableImpl};

lazy_static! {
    static ref AUDIT: CountingHandler = CountingHandler::new();
}

fn audit_declaration() -> HandlerDeclaration {
    HandlerDeclaration::new(DeclarationTarget::Tag("audit".into()), AUDIT.clone())
}

interpose::inventory::submit! {
    DeclarationSubmission {
        declare: audit_declaration,
    }
}

#[test]
fn test_submitted_declaration_applies() {
    let declared = DeclaredPolicy::from_submissions();
    assert!(!declared.is_empty());

    let proxy = Interception::builder()
        .policies(PolicySet::builder().declared(declared).build())
        .build()
        .unwrap()
        .wrap::<WrappableContract, _>(WrappableImpl::new())
        .unwrap();

    proxy.method1();
    assert_eq!(AUDIT.count(), 0);
    assert_eq!(proxy.method3("known".into()).unwrap(), "value");
    assert_eq!(AUDIT.count(), 1);
}
