//! Demo data shared by `MemoryStore::seed_demo` and `norkys-cli seed`.

use rust_decimal::Decimal;

pub struct DemoUser {
    pub id: i32,
    pub email: &'static str,
    pub display_name: &'static str,
}

pub struct DemoItem {
    pub id: i32,
    pub name: &'static str,
    price_cents: i64,
    cost_cents: i64,
}

impl DemoItem {
    #[must_use]
    pub fn price(&self) -> Decimal {
        Decimal::new(self.price_cents, 2)
    }

    #[must_use]
    pub fn cost_basis(&self) -> Decimal {
        Decimal::new(self.cost_cents, 2)
    }
}

pub struct DemoAddress {
    pub id: i32,
    pub user_id: i32,
    pub title: &'static str,
    pub address: &'static str,
    pub reference: Option<&'static str>,
    pub phone_primary: &'static str,
    pub phone_secondary: Option<&'static str>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// User 1 is the default reserved administrator.
pub const USERS: [DemoUser; 3] = [
    DemoUser {
        id: 1,
        email: "admin@norkys.example",
        display_name: "Administrator",
    },
    DemoUser {
        id: 2,
        email: "lucia.quispe@example.com",
        display_name: "Lucía Quispe",
    },
    DemoUser {
        id: 3,
        email: "mateo.rojas@example.com",
        display_name: "Mateo Rojas",
    },
];

const fn item(id: i32, name: &'static str, price_cents: i64, cost_cents: i64) -> DemoItem {
    DemoItem {
        id,
        name,
        price_cents,
        cost_cents,
    }
}

pub const ITEMS: [DemoItem; 7] = [
    item(1, "1/4 Pollo a la brasa", 2190, 980),
    item(2, "1/2 Pollo a la brasa", 3790, 1720),
    item(3, "Pollo entero familiar", 6990, 3150),
    item(4, "Papas fritas grandes", 1290, 420),
    item(5, "Ensalada clásica", 890, 310),
    item(6, "Inca Kola 1.5L", 990, 520),
    item(7, "Chicha morada 1L", 900, 350),
];

pub const ADDRESSES: [DemoAddress; 2] = [
    DemoAddress {
        id: 1,
        user_id: 2,
        title: "Casa",
        address: "Av. Arequipa 1234, Lince",
        reference: Some("Frente al parque"),
        phone_primary: "987654321",
        phone_secondary: None,
        latitude: Some(-12.0843),
        longitude: Some(-77.0351),
    },
    DemoAddress {
        id: 2,
        user_id: 3,
        title: "Oficina",
        address: "Calle Las Begonias 415, San Isidro",
        reference: None,
        phone_primary: "912345678",
        phone_secondary: Some("014405566"),
        latitude: None,
        longitude: None,
    },
];
