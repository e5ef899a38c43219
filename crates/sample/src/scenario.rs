//! Scripted run of the sample modules.
//!
//! One correlation id covers the whole flow: a user signs up, a product is
//! registered, the user's cart is filled and confirmed, and the order is
//! shipped and delivered. Each step is caused by the event before it.

use common::StreamId;
use domain::{
    AddProduct, Aggregate, ClientId, CommandResult, ConfirmShoppingCart, CreateUser,
    DeliverPackage, InMemoryProductAvailability, InMemorySkuIndex, Money, OpenShoppingCart,
    OrderId, PackageService, PricedProductItem, ProductId, ProductItem, ProductService,
    RegisterProduct, SendPackage, ShoppingCartService, UpdateUserName, UserService,
};
use event_store::{EventContext, EventEnvelope, EventStore, GlobalPosition};
use publisher::PublisherBridge;
use uuid::Uuid;

use crate::error::Result;

/// Outcome of [`run_scenario`].
#[derive(Debug, Default)]
pub struct ScenarioReport {
    pub user_id: StreamId,
    pub product_id: ProductId,
    pub cart_id: StreamId,
    pub package_id: StreamId,
    /// Every committed envelope, in commit order.
    pub envelopes: Vec<EventEnvelope>,
    /// Envelopes committed but not confirmed by the bus.
    pub unpublished: usize,
    /// Position of the first envelope the bus did not confirm.
    pub first_unpublished: Option<GlobalPosition>,
}

impl ScenarioReport {
    /// Position of the last committed envelope.
    pub fn last_position(&self) -> Option<GlobalPosition> {
        self.envelopes.last().map(EventEnvelope::global_position)
    }

    /// True if the bus confirmed every committed envelope.
    pub fn all_published(&self) -> bool {
        self.unpublished == 0
    }

    /// Where a reconciler should start so nothing unpublished is skipped.
    ///
    /// This is the position just before the first unconfirmed envelope, or
    /// the last position when everything was confirmed.
    pub fn reconcile_from(&self) -> GlobalPosition {
        match self.first_unpublished {
            Some(position) => GlobalPosition::new(position.as_i64() - 1),
            None => self.last_position().unwrap_or_else(GlobalPosition::start),
        }
    }

    fn record<A: Aggregate>(&mut self, result: &CommandResult<A>) -> Option<EventEnvelope> {
        if let Some(error) = &result.publish_error {
            self.unpublished += result.envelopes.len();
            let failed = error
                .failed_position()
                .or_else(|| result.envelopes.first().map(EventEnvelope::global_position));
            self.first_unpublished = self.first_unpublished.or(failed);
        }
        self.envelopes.extend(result.envelopes.iter().cloned());
        result.envelopes.last().cloned()
    }
}

/// Runs the scripted flow against `store`, publishing through `publisher`.
#[tracing::instrument(skip_all)]
pub async fn run_scenario<S>(store: S, publisher: PublisherBridge) -> Result<ScenarioReport>
where
    S: EventStore + Clone,
{
    let users = UserService::new(store.clone()).with_publisher(publisher.clone());
    let products =
        ProductService::new(store.clone(), InMemorySkuIndex::new()).with_publisher(publisher.clone());
    let carts = ShoppingCartService::new(store.clone()).with_publisher(publisher.clone());
    let availability = InMemoryProductAvailability::new();
    let packages = PackageService::new(store, availability.clone()).with_publisher(publisher);

    let mut report = ScenarioReport::default();
    let mut context = EventContext::for_command(Uuid::new_v4(), None);
    tracing::info!(correlation_id = %context.correlation_id, "starting scenario");

    // Users
    let create = CreateUser::named("John Doe");
    report.user_id = create.user_id;
    let created = users.create_user(create, context).await?;
    context = caused_by(report.record(&created), context);

    let renamed = users
        .update_user_name(UpdateUserName::new(report.user_id, "Adam Smith"), context)
        .await?;
    context = caused_by(report.record(&renamed), context);
    tracing::info!(
        user_id = %report.user_id,
        name = renamed.aggregate.name(),
        version = %renamed.new_version,
        "user renamed"
    );

    // Products
    let register = RegisterProduct::with(
        Some(Uuid::new_v4()),
        Some("CC0001"),
        Some("Coffee beans"),
        Some("Single origin, 1kg"),
    )?;
    report.product_id = register.product_id;
    let registered = products.register_product(register, context).await?;
    context = caused_by(report.record(&registered), context);
    availability.set_stock(report.product_id, 10).await;

    // Shopping cart
    let open = OpenShoppingCart::for_client(ClientId::from_uuid(report.user_id.as_uuid()));
    report.cart_id = open.cart_id;
    let opened = carts.open_cart(open, context).await?;
    context = caused_by(report.record(&opened), context);

    let item = PricedProductItem::new(report.product_id, 2, Money::from_cents(1250));
    let added = carts
        .add_product(AddProduct::new(report.cart_id, item), context)
        .await?;
    context = caused_by(report.record(&added), context);

    let confirmed = carts
        .confirm_cart(
            ConfirmShoppingCart::at_version(report.cart_id, added.new_version),
            context,
        )
        .await?;
    context = caused_by(report.record(&confirmed), context);
    tracing::info!(
        cart_id = %report.cart_id,
        total = %confirmed.aggregate.total_amount(),
        "cart confirmed"
    );

    // Shipment
    let send = SendPackage::for_order(
        OrderId::from_uuid(report.cart_id.as_uuid()),
        vec![ProductItem::new(report.product_id, 2)],
    );
    report.package_id = send.package_id;
    let sent = packages.send_package(send, context).await?;
    context = caused_by(report.record(&sent), context);

    let delivered = packages
        .deliver_package(DeliverPackage::new(report.package_id), context)
        .await?;
    report.record(&delivered);

    tracing::info!(
        events = report.envelopes.len(),
        unpublished = report.unpublished,
        "scenario finished"
    );

    Ok(report)
}

fn caused_by(envelope: Option<EventEnvelope>, fallback: EventContext) -> EventContext {
    envelope
        .as_ref()
        .map(EventContext::caused_by)
        .unwrap_or(fallback)
}
