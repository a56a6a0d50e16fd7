use actix_web::{http::StatusCode, HttpResponse};
use henka_core::{PriceSource, Prices, Selection};
use log::{debug, error};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use tera::{Context, Tera};

/// Shared across workers via `web::Data`.
pub struct AppState {
    source: Arc<dyn PriceSource>,
    cache: PriceCache,
    templates: Tera,
}

impl AppState {
    pub fn new(source: Arc<dyn PriceSource>) -> anyhow::Result<Self> {
        Self::with_cache_capacity(source, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_cache_capacity(
        source: Arc<dyn PriceSource>,
        capacity: usize,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            source,
            cache: PriceCache::new(capacity),
            templates: templates()?,
        })
    }

    /// Daily prices for the selection; the provider is only asked when the cache misses.
    pub async fn load_prices(&self, selection: &Selection) -> anyhow::Result<Arc<Prices>> {
        if let Some(prices) = self.cache.get(selection) {
            debug!("[{}] serving {} cached prices", selection.ticker, prices.len());
            return Ok(prices);
        }

        let prices = self
            .source
            .prices(&selection.ticker, selection.start, selection.end)
            .await?;
        let prices = Arc::new(prices);
        self.cache.insert(selection.clone(), prices.clone());
        debug!(
            "[{}] cached {} prices, {} selections held",
            selection.ticker,
            prices.len(),
            self.cache.len()
        );
        Ok(prices)
    }

    pub fn render(&self, template: &str, ctx: &Context, status: StatusCode) -> HttpResponse {
        match self.templates.render(template, ctx) {
            Ok(body) => HttpResponse::build(status)
                .content_type("text/html; charset=utf-8")
                .body(body),
            Err(e) => {
                error!("failed to render {template}: {e:?}");
                HttpResponse::InternalServerError().body("Template rendering failed")
            }
        }
    }
}

fn templates() -> anyhow::Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("layout.html", include_str!("../templates/layout.html")),
        ("step1.html", include_str!("../templates/step1.html")),
        ("review.html", include_str!("../templates/review.html")),
    ])?;
    Ok(tera)
}

/// Selections kept in memory unless `HENKA_CACHE_CAPACITY` says otherwise.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Memo of successful fetches, least recently used selection evicted first;
/// errors never land here.
pub struct PriceCache {
    capacity: usize,
    inner: Mutex<CacheEntries>,
}

#[derive(Default)]
struct CacheEntries {
    prices: HashMap<Selection, Arc<Prices>>,
    // front is the least recently used
    order: VecDeque<Selection>,
}

impl CacheEntries {
    fn touch(&mut self, selection: &Selection) {
        self.order.retain(|s| s != selection);
        self.order.push_back(selection.clone());
    }
}

impl PriceCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(CacheEntries::default()),
        }
    }

    pub fn get(&self, selection: &Selection) -> Option<Arc<Prices>> {
        let mut entries = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let prices = entries.prices.get(selection).cloned()?;
        entries.touch(selection);
        Some(prices)
    }

    pub fn insert(&self, selection: Selection, prices: Arc<Prices>) {
        let mut entries = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        entries.touch(&selection);
        entries.prices.insert(selection, prices);

        while entries.prices.len() > self.capacity {
            let Some(oldest) = entries.order.pop_front() else {
                break;
            };
            debug!("[{}] evicting cached prices for {}", oldest.ticker, oldest.range_label());
            entries.prices.remove(&oldest);
        }
    }

    pub fn len(&self) -> usize {
        let entries = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        entries.prices.len()
    }
}
