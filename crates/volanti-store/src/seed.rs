//! Demo catalog seeding: a fixed Spanish product list and random orders.

use chrono::{DateTime, Duration, Utc};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::sqlite::SqliteCatalog;
use crate::types::{NewOrder, NewProduct, ProductSummary};
use volanti_core::{Error, Result};

/// Number of orders generated by [`seed_catalog`].
pub const SEED_ORDER_COUNT: usize = 15;

const ORDER_STATUSES: [&str; 4] = ["Procesando", "Enviado", "Entregado", "Cancelado"];
const STATUS_WEIGHTS: [f64; 4] = [0.3, 0.4, 0.2, 0.1];

const DEFAULT_PRODUCTS: &[(&str, &str, f64)] = &[
    // Herramientas
    ("Destornillador Phillips", "Destornillador de alta calidad con punta Phillips para trabajos de precisión.", 8.99),
    ("Martillo de Carpintero", "Martillo resistente con mango ergonómico para trabajos de construcción.", 12.50),
    ("Llave Ajustable 8\"", "Llave inglesa de acero inoxidable con ajuste preciso.", 15.75),
    ("Set de Destornilladores (10 piezas)", "Conjunto completo de destornilladores de precisión para todo tipo de proyectos.", 24.99),
    ("Sierra Circular Eléctrica", "Sierra potente para cortes precisos en madera y otros materiales.", 89.99),
    // Accesorios para coches
    ("Rueda de Repuesto Universal", "Rueda de emergencia compatible con múltiples modelos de vehículos.", 45.99),
    ("Limpiaparabrisas Premium", "Par de limpiaparabrisas de alta durabilidad resistentes a condiciones extremas.", 22.50),
    ("Cubierta para Volante", "Funda para volante de cuero sintético con diseño ergonómico.", 18.25),
    ("Organizador para Maletero", "Organizador plegable para mantener el maletero ordenado.", 29.99),
    ("Cargador USB para Coche", "Cargador rápido con dos puertos USB para dispositivos móviles.", 14.50),
    // Iluminación
    ("Lámpara de Escritorio LED", "Lámpara moderna con luz ajustable y bajo consumo energético.", 32.99),
    ("Lámpara de Pie Moderna", "Elegante lámpara de pie con altura ajustable y luz cálida.", 79.50),
    ("Tira de Luces LED 5m", "Tira flexible de luces LED con control remoto y múltiples colores.", 24.75),
    ("Bombilla Inteligente WiFi", "Bombilla controlable desde el móvil compatible con asistentes de voz.", 19.99),
    ("Lámpara Solar para Jardín", "Conjunto de 4 lámparas solares para iluminación exterior.", 34.50),
    // Electrónica
    ("Auriculares Bluetooth", "Auriculares inalámbricos con cancelación de ruido y gran autonomía.", 59.99),
    ("Altavoz Portátil Resistente al Agua", "Altavoz compacto con sonido 360° y resistencia IPX7.", 45.75),
    ("Cargador Inalámbrico", "Base de carga rápida compatible con todos los smartphones modernos.", 29.99),
    ("Batería Externa 10000mAh", "Powerbank de alta capacidad con carga rápida para múltiples dispositivos.", 25.50),
    ("Adaptador HDMI a USB-C", "Adaptador de alta velocidad para conectar dispositivos modernos a pantallas.", 18.99),
    // Hogar
    ("Set de Sartenes Antiadherentes", "Conjunto de 3 sartenes de diferentes tamaños con recubrimiento premium.", 64.99),
    ("Almohada Ergonómica", "Almohada con espuma viscoelástica para un descanso óptimo.", 39.50),
    ("Cafetera Programable", "Cafetera automática con temporizador y función de mantener caliente.", 55.75),
    ("Set de Cuchillos de Cocina", "Conjunto profesional de 5 cuchillos con soporte de madera.", 49.99),
    ("Robot Aspirador Inteligente", "Aspirador automático con mapeo y control por aplicación móvil.", 199.50),
];

/// Outcome of a seeding run.
#[derive(Debug, Clone, Default)]
pub struct SeedReport {
    pub products: usize,
    pub orders: usize,
}

/// The built-in demo catalog.
pub fn default_products() -> Vec<NewProduct> {
    DEFAULT_PRODUCTS
        .iter()
        .map(|(name, description, price)| NewProduct::new(*name, *description, *price))
        .collect()
}

/// Generate `count` random orders over `products`.
///
/// Each order holds 1–4 distinct products; the total is the product sum plus
/// 5–15 shipping, rounded to cents. Estimated delivery depends on status and
/// is absent for cancelled orders.
pub fn generate_orders<R: Rng + ?Sized>(
    rng: &mut R,
    products: &[ProductSummary],
    count: usize,
    now: DateTime<Utc>,
) -> Result<Vec<NewOrder>> {
    if products.is_empty() {
        return Ok(Vec::new());
    }
    let status_dist =
        WeightedIndex::new(STATUS_WEIGHTS).map_err(|e| Error::Internal(e.to_string()))?;

    let mut orders = Vec::with_capacity(count);
    for _ in 0..count {
        let line_count = rng.gen_range(1..=4usize).min(products.len());
        let chosen: Vec<&ProductSummary> = products.choose_multiple(rng, line_count).collect();

        let shipping = round_cents(rng.gen_range(5.0..15.0));
        let subtotal: f64 = chosen.iter().map(|p| p.price).sum();
        let total_paid = round_cents(subtotal + shipping);

        let status = ORDER_STATUSES[status_dist.sample(rng)];
        let created_at = now - Duration::days(rng.gen_range(1..=30));
        let estimated_delivery = match status {
            "Procesando" => Some(created_at + Duration::days(rng.gen_range(5..=10))),
            "Enviado" => Some(created_at + Duration::days(rng.gen_range(2..=5))),
            "Entregado" => {
                let eta = created_at + Duration::days(rng.gen_range(1..=3));
                // Delivered orders must not promise a future date.
                Some(if eta >= now { now - Duration::days(1) } else { eta })
            }
            _ => None,
        };

        orders.push(NewOrder {
            status: status.to_string(),
            estimated_delivery,
            product_ids: chosen.iter().map(|p| p.id).collect(),
            total_paid,
            created_at,
        });
    }
    Ok(orders)
}

/// Replace the catalog contents with the demo products and random orders.
pub fn seed_catalog<R: Rng + ?Sized>(store: &SqliteCatalog, rng: &mut R) -> Result<SeedReport> {
    store.clear()?;

    let mut inserted = Vec::new();
    for product in default_products() {
        let id = store.add_product(&product)?;
        debug!("Added product: {}", product.name);
        inserted.push(ProductSummary {
            id,
            name: product.name,
            description: product.description,
            price: product.price,
        });
    }

    let orders = generate_orders(rng, &inserted, SEED_ORDER_COUNT, Utc::now())?;
    for (i, order) in orders.iter().enumerate() {
        let order_id = store.add_order(order)?;
        debug!("Added order {}: {}", i + 1, order_id);
    }

    info!(
        "Catalog seeded with {} products and {} orders",
        inserted.len(),
        orders.len()
    );
    Ok(SeedReport {
        products: inserted.len(),
        orders: orders.len(),
    })
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
