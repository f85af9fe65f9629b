//! Subscription broker module

mod subscription_broker;

pub use subscription_broker::SubscriptionBroker;
