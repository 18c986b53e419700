use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use uuid::Uuid;

/// Number of products returned per search.
pub const RESULT_COUNT: usize = 4;

/// Immutable product template owned by a category pool.
#[derive(Debug)]
pub struct CatalogEntry {
    pub title: &'static str,
    pub price: &'static str,
    pub rating: f64,
}

const ELECTRONICS: [CatalogEntry; 5] = [
    CatalogEntry {
        title: "Wireless Bluetooth Earbuds",
        price: "$49.99",
        rating: 4.5,
    },
    CatalogEntry {
        title: "Noise Cancelling Headphones",
        price: "$129.99",
        rating: 4.8,
    },
    CatalogEntry {
        title: "Portable Bluetooth Speaker",
        price: "$34.99",
        rating: 4.7,
    },
    CatalogEntry {
        title: "Smart Watch with Heart Rate Monitor",
        price: "$79.99",
        rating: 4.2,
    },
    CatalogEntry {
        title: "Wireless Charging Pad",
        price: "$25.99",
        rating: 4.0,
    },
];

const HOME: [CatalogEntry; 5] = [
    CatalogEntry {
        title: "Smart LED Light Bulbs",
        price: "$39.99",
        rating: 4.6,
    },
    CatalogEntry {
        title: "Robot Vacuum Cleaner",
        price: "$199.99",
        rating: 4.4,
    },
    CatalogEntry {
        title: "Air Purifier with HEPA Filter",
        price: "$89.99",
        rating: 4.3,
    },
    CatalogEntry {
        title: "Digital Kitchen Scale",
        price: "$15.99",
        rating: 4.5,
    },
    CatalogEntry {
        title: "Non-Stick Cookware Set",
        price: "$75.99",
        rating: 4.7,
    },
];

const APPAREL: [CatalogEntry; 5] = [
    CatalogEntry {
        title: "Men's Running Shoes",
        price: "$65.99",
        rating: 4.2,
    },
    CatalogEntry {
        title: "Women's Yoga Pants",
        price: "$29.99",
        rating: 4.6,
    },
    CatalogEntry {
        title: "Waterproof Hiking Jacket",
        price: "$79.99",
        rating: 4.5,
    },
    CatalogEntry {
        title: "Cotton T-Shirt 3-Pack",
        price: "$24.99",
        rating: 4.3,
    },
    CatalogEntry {
        title: "Winter Thermal Gloves",
        price: "$19.99",
        rating: 4.4,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Electronics,
    Home,
    Apparel,
}

impl Category {
    pub fn name(&self) -> &'static str {
        match self {
            Category::Electronics => "Electronics",
            Category::Home => "Home",
            Category::Apparel => "Apparel",
        }
    }

    /// Product templates owned by this category.
    pub fn pool(&self) -> &'static [CatalogEntry] {
        match self {
            Category::Electronics => &ELECTRONICS,
            Category::Home => &HOME,
            Category::Apparel => &APPAREL,
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Category::Electronics => &["headphone", "earbud", "speaker", "watch", "electronic"],
            Category::Home => &["light", "vacuum", "kitchen", "home", "cook"],
            Category::Apparel => &[],
        }
    }

    /// Route a search query to a category by keyword match, with Apparel
    /// as the fallback when nothing matches.
    pub fn route(query: &str) -> Category {
        let lowered = query.to_lowercase();

        for category in &[Category::Electronics, Category::Home] {
            if category.keywords().iter().any(|kw| lowered.contains(kw)) {
                return *category;
            }
        }

        Category::Apparel
    }
}

/// Product listing returned to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductResult {
    pub id: String,
    pub title: String,
    pub price: String,
    pub rating: f64,
    pub image: String,
    pub url: String,
    pub relevance: f64,
}

/// Commerce backend contract. The mock implementation below is the only
/// one wired up; a real provider would implement the same search surface.
pub trait ProductProvider {
    fn search(&self, query: &str) -> Vec<ProductResult>;
}

pub struct MockCommerce;

impl ProductProvider for MockCommerce {
    fn search(&self, query: &str) -> Vec<ProductResult> {
        select_products(query)
    }
}

/// Seed for the per-call generator: sum of the code points of the
/// original (non-lowercased) query.
fn query_seed(query: &str) -> u64 {
    query.chars().map(|c| c as u64).sum()
}

fn product_id(query: &str, position: usize) -> String {
    Uuid::new_v5(
        &Uuid::NAMESPACE_DNS,
        format!("{}-{}", query, position).as_bytes(),
    )
    .to_string()
}

/// Select four products for a search query.
///
/// The same query always yields the same products in the same order with
/// the same ids and relevance scores: the generator is seeded from the
/// query and scoped to this call, and the draw order is fixed (one index
/// shuffle, then one relevance draw per product).
pub fn select_products(query: &str) -> Vec<ProductResult> {
    let category = Category::route(query);
    let pool = category.pool();

    debug!("query {:?} routed to category {}", query, category.name());

    let mut rng = StdRng::seed_from_u64(query_seed(query));

    let mut indices: Vec<usize> = (0..pool.len()).collect();
    indices.shuffle(&mut rng);

    indices
        .into_iter()
        .take(RESULT_COUNT)
        .enumerate()
        .map(|(i, idx)| {
            let entry = &pool[idx];
            let id = product_id(query, i);
            let jitter: u64 = rng.gen_range(0..10);
            let relevance = ((100.0 - i as f64 * 5.0 - jitter as f64) * 10.0).round() / 10.0;

            ProductResult {
                title: entry.title.to_owned(),
                price: entry.price.to_owned(),
                rating: entry.rating,
                image: format!(
                    "https://via.placeholder.com/150?text={}+Product",
                    category.name()
                ),
                url: format!("https://amazon.com/dp/{}", id),
                relevance,
                id,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_titles(category: Category) -> Vec<&'static str> {
        category.pool().iter().map(|e| e.title).collect()
    }

    #[test]
    fn same_query_same_products() {
        let a = select_products("Headphones Electronics Wireless");
        let b = select_products("Headphones Electronics Wireless");

        assert_eq!(a, b);
    }

    #[test]
    fn routes_to_electronics() {
        let products = select_products("wireless bluetooth speaker");
        let titles = pool_titles(Category::Electronics);

        for product in &products {
            assert!(titles.contains(&product.title.as_str()));
        }
    }

    #[test]
    fn routes_to_home() {
        let products = select_products("kitchen scale");
        let titles = pool_titles(Category::Home);

        for product in &products {
            assert!(titles.contains(&product.title.as_str()));
        }
    }

    #[test]
    fn unmatched_query_falls_back_to_apparel() {
        let products = select_products("random shoes");
        let titles = pool_titles(Category::Apparel);

        for product in &products {
            assert!(titles.contains(&product.title.as_str()));
        }
    }

    #[test]
    fn always_four_products() {
        for query in &["", "kitchen", "speaker", "völlig unbekannt"] {
            assert_eq!(select_products(query).len(), RESULT_COUNT);
        }
    }

    #[test]
    fn relevance_stays_in_position_band() {
        let products = select_products("smart watch");

        for (i, product) in products.iter().enumerate() {
            let top = 100.0 - i as f64 * 5.0;
            assert!(product.relevance <= top);
            assert!(product.relevance >= top - 9.0);
        }
    }

    #[test]
    fn ids_are_stable_per_query_and_position() {
        let first = select_products("kitchen scale");
        let second = select_products("kitchen scale");
        let other = select_products("kitchen scales");

        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.id, b.id);
            assert!(Uuid::parse_str(&a.id).is_ok());
        }

        // A different query reseeds identity even when titles overlap.
        assert_ne!(first[0].id, other[0].id);
    }

    #[test]
    fn distinct_ids_within_one_result_set() {
        let products = select_products("cotton shirt");
        for (i, a) in products.iter().enumerate() {
            for b in &products[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn url_embeds_product_id() {
        for product in select_products("robot vacuum") {
            assert_eq!(product.url, format!("https://amazon.com/dp/{}", product.id));
        }
    }

    #[test]
    fn image_url_names_the_category() {
        for product in select_products("noise cancelling headphones") {
            assert!(product.image.contains("Electronics+Product"));
        }
    }

    #[test]
    fn empty_query_is_deterministic_apparel() {
        let a = select_products("");
        let b = select_products("");
        let titles = pool_titles(Category::Apparel);

        assert_eq!(a, b);
        for product in &a {
            assert!(titles.contains(&product.title.as_str()));
        }
    }
}
