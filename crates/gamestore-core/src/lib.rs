pub mod game;
pub mod net;
pub mod session;
pub mod snapshot;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::game::{GameDoc, GameFields};
    use crate::session::User;
    use crate::snapshot::Snapshot;

    /// Create valid fields with the given title and price.
    pub fn make_fields(title: &str, price: f64) -> GameFields {
        GameFields {
            title: title.to_string(),
            image: format!("https://img.example.com/{}.png", title.to_lowercase()),
            price,
            description: format!("{title} for the whole family"),
        }
    }

    /// Create a valid document with the given id, title and price.
    pub fn make_doc(id: &str, title: &str, price: f64) -> GameDoc {
        GameDoc {
            id: id.to_string(),
            fields: make_fields(title, price),
        }
    }

    /// Create a snapshot from `(id, title, price)` triples, in order.
    pub fn make_snapshot(version: u64, entries: &[(&str, &str, f64)]) -> Snapshot {
        Snapshot {
            version,
            games: entries
                .iter()
                .map(|(id, title, price)| make_doc(id, title, *price))
                .collect(),
        }
    }

    pub fn make_user(email: &str) -> User {
        User {
            email: email.to_string(),
        }
    }
}
