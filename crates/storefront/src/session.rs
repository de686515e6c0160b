//! Storefront session: the controller that views talk to.
//!
//! A session owns the cart store, the checkout form, and the checkout flow.
//! Every cart command and form edit re-runs the cart review and the form
//! validation and feeds them to the flow, so the flow state is always
//! derived from the latest cart and form.
//!
//! The two suspending operations (catalog load and order submission) run as
//! [`ViewTask`]s. Starting one hands back the task; finishing it applies the
//! result, unless the task was cancelled or the flow moved on meanwhile.

use std::sync::Arc;

use medina_core::{
    Cart, CartReview, CartTotals, CheckoutFlow, CheckoutForm, CheckoutState, ContactForm,
    ContactMessage, ExchangeRate, FormValidation, OrderDraft, Product, ProductFilter, ProductId, ShippingPolicy,
    SubmissionTicket, review_cart, validate_form,
};
use tracing::{debug, info, instrument};

use crate::catalog::{CatalogClient, CatalogError};
use crate::config::StorefrontConfig;
use crate::error::{Result, StorefrontError, add_breadcrumb};
use crate::orders::{OrderClient, OrderReceipt, SubmitError};
use crate::storage::{CartStorage, FileCartStorage};
use crate::store::{CartCommand, CartStore};
use crate::task::ViewTask;

/// Reason recorded on the flow when a submission is abandoned.
const CANCELLED_REASON: &str = "Submission cancelled";

/// A catalog load in flight.
pub type CatalogLoad = ViewTask<std::result::Result<Arc<Vec<Product>>, CatalogError>>;

/// An order submission in flight.
#[derive(Debug)]
pub struct PendingSubmission {
    pub ticket: SubmissionTicket,
    pub task: ViewTask<std::result::Result<OrderReceipt, SubmitError>>,
}

impl PendingSubmission {
    /// Abandon the submission; its outcome will be discarded.
    pub fn cancel(&self) {
        self.task.cancel();
    }
}

/// One shopper's storefront session.
#[derive(Debug)]
pub struct StorefrontSession<S> {
    catalog: CatalogClient,
    orders: OrderClient,
    store: CartStore<S>,
    flow: CheckoutFlow,
    form: CheckoutForm,
    shipping: ShippingPolicy,
    exchange_rate: ExchangeRate,
    subject: String,
    contact_subject: String,
    products: Arc<Vec<Product>>,
}

impl StorefrontSession<FileCartStorage> {
    /// Session backed by the configured cart directory.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn from_config(config: &StorefrontConfig) -> Result<Self> {
        Self::new(config, FileCartStorage::new(&config.cart_storage_dir))
    }
}

impl<S: CartStorage> StorefrontSession<S> {
    /// Build a session and restore the cart from `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn new(config: &StorefrontConfig, storage: S) -> Result<Self> {
        let mut session = Self {
            catalog: CatalogClient::new(&config.catalog)?,
            orders: OrderClient::new(&config.orders)?,
            store: CartStore::open(storage),
            flow: CheckoutFlow::new(),
            form: CheckoutForm::default(),
            shipping: config.shipping.clone(),
            exchange_rate: config.exchange_rate,
            subject: config.orders.subject.clone(),
            contact_subject: config.orders.contact_subject.clone(),
            products: Arc::new(Vec::new()),
        };
        session.sync();
        Ok(session)
    }

    // --- Catalog ---

    #[must_use]
    pub const fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    /// Start fetching the product listing.
    #[must_use]
    pub fn start_catalog_load(&self) -> CatalogLoad {
        let catalog = self.catalog.clone();
        ViewTask::spawn(async move { catalog.list_products().await })
    }

    /// Apply the outcome of a catalog load.
    ///
    /// A failed load leaves the product list empty.
    ///
    /// # Errors
    ///
    /// Returns the catalog error after reporting it.
    pub fn apply_catalog(
        &mut self,
        outcome: std::result::Result<Arc<Vec<Product>>, CatalogError>,
    ) -> Result<&[Product]> {
        match outcome {
            Ok(products) => {
                debug!(count = products.len(), "Catalog loaded");
                self.products = products;
                Ok(&self.products)
            }
            Err(e) => {
                self.products = Arc::new(Vec::new());
                let err = StorefrontError::from(e);
                err.report();
                Err(err)
            }
        }
    }

    /// Load the product listing and wait for it.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Cancelled`] if the load was cancelled and
    /// the catalog error if it failed.
    pub async fn load_catalog(&mut self) -> Result<&[Product]> {
        let Some(outcome) = self.start_catalog_load().join().await else {
            return Err(StorefrontError::Cancelled);
        };
        self.apply_catalog(outcome)
    }

    /// Fetch one product by id.
    ///
    /// # Errors
    ///
    /// Returns the catalog error, e.g. [`CatalogError::NotFound`].
    pub async fn product(&self, id: ProductId) -> Result<Product> {
        Ok(self.catalog.product(id).await?)
    }

    /// Products from the last successful load.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn filtered(&self, filter: &ProductFilter) -> Vec<&Product> {
        filter.apply(&self.products)
    }

    // --- Cart ---

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        self.store.cart()
    }

    /// Apply a cart command and re-derive the checkout state.
    pub fn dispatch(&mut self, command: &CartCommand) -> &Cart {
        self.store.dispatch(command);
        self.sync();
        self.store.cart()
    }

    /// Totals for the current cart, shipped to the city on the form.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals::compute(self.store.cart(), &self.form.city, &self.shipping)
    }

    #[must_use]
    pub fn review(&self) -> CartReview {
        review_cart(self.store.cart())
    }

    // --- Checkout ---

    #[must_use]
    pub const fn state(&self) -> &CheckoutState {
        self.flow.state()
    }

    #[must_use]
    pub const fn form(&self) -> &CheckoutForm {
        &self.form
    }

    #[must_use]
    pub fn validation(&self) -> FormValidation {
        validate_form(&self.form, self.store.cart())
    }

    /// Move to the checkout form.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Checkout`] if the cart has not passed
    /// review or a submission is in flight.
    pub fn open_checkout(&mut self) -> Result<&CheckoutState> {
        self.flow.open_form()?;
        add_breadcrumb("checkout", "open_form", None);
        let validation = self.validation();
        Ok(self.flow.sync_form(&validation))
    }

    /// Edit the form and re-validate it.
    pub fn edit_form(&mut self, edit: impl FnOnce(&mut CheckoutForm)) -> FormValidation {
        edit(&mut self.form);
        let validation = self.validation();
        self.flow.sync_form(&validation);
        validation
    }

    /// Build the order and start sending it.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Checkout`] if the cart is empty, the form is
    /// invalid, or the flow is not ready to submit.
    #[instrument(skip(self))]
    pub fn start_submission(&mut self) -> Result<PendingSubmission> {
        let draft = OrderDraft::prepare(
            &self.form,
            self.store.cart(),
            &self.shipping,
            self.exchange_rate,
        )?;
        let ticket = self.flow.begin_submission()?;
        let payload = draft.into_payload(&self.subject);

        let reference = payload.reference.to_string();
        add_breadcrumb(
            "checkout",
            "submit",
            Some(&[("reference", reference.as_str())]),
        );
        info!(reference = %reference, "Submitting order");

        let orders = self.orders.clone();
        let task = ViewTask::spawn(async move { orders.submit(&payload).await });
        Ok(PendingSubmission { ticket, task })
    }

    /// Apply the outcome of a submission; `None` means it was cancelled.
    ///
    /// The form and the cart are left as they are either way.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Cancelled`] for a cancelled submission and
    /// [`StorefrontError::Submit`] when the order was not accepted.
    pub fn finish_submission(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Option<std::result::Result<OrderReceipt, SubmitError>>,
    ) -> Result<OrderReceipt> {
        match outcome {
            None => {
                self.flow
                    .complete_submission(ticket, Err(CANCELLED_REASON.to_string()));
                Err(StorefrontError::Cancelled)
            }
            Some(Ok(receipt)) => {
                if !self.flow.complete_submission(ticket, Ok(())) {
                    debug!("Order accepted after the checkout moved on");
                }
                Ok(receipt)
            }
            Some(Err(e)) => {
                let err = StorefrontError::from(e);
                err.report();
                if !self
                    .flow
                    .complete_submission(ticket, Err(err.user_message()))
                {
                    debug!("Stale submission failure ignored");
                }
                Err(err)
            }
        }
    }

    /// Send the order and wait for the outcome.
    ///
    /// # Errors
    ///
    /// Same as [`Self::start_submission`] and [`Self::finish_submission`].
    pub async fn submit_order(&mut self) -> Result<OrderReceipt> {
        let PendingSubmission { ticket, task } = self.start_submission()?;
        let outcome = task.join().await;
        self.finish_submission(ticket, outcome)
    }

    // --- Contact ---

    /// Send a contact message and clear the form once it is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Contact`] for an incomplete form and
    /// [`StorefrontError::ContactNotSent`] when delivery fails. The form is
    /// kept in both cases.
    pub async fn send_contact(&self, form: &mut ContactForm) -> Result<OrderReceipt> {
        let message = ContactMessage::prepare(form, &self.contact_subject)?;
        add_breadcrumb("contact", "send", None);

        match self.orders.send_contact(&message).await {
            Ok(receipt) => {
                form.clear();
                Ok(receipt)
            }
            Err(e) => {
                let err = StorefrontError::ContactNotSent(e);
                err.report();
                Err(err)
            }
        }
    }

    fn sync(&mut self) {
        let review = review_cart(self.store.cart());
        self.flow.sync_cart(&review);
        let validation = self.validation();
        self.flow.sync_form(&validation);
    }
}
