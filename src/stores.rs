use std::collections::HashMap;

use lazy_static::lazy_static;

/// A physical store location carrying the as-is corner we poll.
#[derive(Debug, Clone)]
pub struct Store {
    pub id: &'static str,
    pub name: &'static str,
    pub address: &'static str,
    pub lat: f64,
    pub lng: f64,
}

lazy_static! {
    /// Built-in directory of supported stores, keyed by provider store id.
    pub static ref STORES: HashMap<&'static str, Store> = {
        let mut m = HashMap::new();
        for store in [
            Store {
                id: "415",
                name: "Amersfoort",
                address: "Euroweg 101, 3825 HA Amersfoort, Netherlands",
                lat: 52.1901,
                lng: 5.4171,
            },
            Store {
                id: "088",
                name: "Amsterdam",
                address: "Hullenbergweg 2, 1101 BL Amsterdam-Zuidoost, Netherlands",
                lat: 52.3007,
                lng: 4.9475,
            },
            Store {
                id: "274",
                name: "Barendrecht",
                address: "Kolding 1, 2993 LD Barendrecht, Netherlands",
                lat: 51.8703,
                lng: 4.5208,
            },
            Store {
                id: "378",
                name: "Haarlem",
                address: "Laan van Decima 1, 2031 CX Haarlem, Netherlands",
                lat: 52.3896,
                lng: 4.6515,
            },
            Store {
                id: "403",
                name: "Breda",
                address: "Sijltsstraat 1, 4814 DC Breda, Netherlands",
                lat: 51.5963,
                lng: 4.7364,
            },
            Store {
                id: "151",
                name: "Delft",
                address: "Olof Palmestraat 1, 2616 LN Delft, Netherlands",
                lat: 52.0083,
                lng: 4.3675,
            },
            Store {
                id: "272",
                name: "Duiven",
                address: "Nieuwgraaf 320, 6921 RJ Duiven, Netherlands",
                lat: 51.9579,
                lng: 6.0144,
            },
            Store {
                id: "087",
                name: "Eindhoven",
                address: "Ekkersrijt 4089, 5692 DB Son, Netherlands",
                lat: 51.4951,
                lng: 5.4623,
            },
            Store {
                id: "404",
                name: "Groningen",
                address: "Sontweg 9, 9723 AT Groningen, Netherlands",
                lat: 53.2175,
                lng: 6.5922,
            },
            Store {
                id: "089",
                name: "Heerlen",
                address: "In de Cramer 142, 6412 PM Heerlen, Netherlands",
                lat: 50.9005,
                lng: 5.9373,
            },
            Store {
                id: "312",
                name: "Hengelo",
                address: "Hasseler Es 2, 7559 DD Hengelo, Netherlands",
                lat: 52.2824,
                lng: 6.7958,
            },
            Store {
                id: "270",
                name: "Utrecht",
                address: "Winthontlaan 2, 3526 KV Utrecht, Netherlands",
                lat: 52.0827,
                lng: 5.1004,
            },
            Store {
                id: "391",
                name: "Zwolle",
                address: "Grote Voort 2, 8041 AM Zwolle, Netherlands",
                lat: 52.5238,
                lng: 6.1141,
            },
        ] {
            m.insert(store.id, store);
        }
        m
    };
}

pub fn get_store(store_id: &str) -> Option<&'static Store> {
    STORES.get(store_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_store_lookup() {
        let store = get_store("088").unwrap();
        assert_eq!(store.name, "Amsterdam");
        assert!(store.lat > 52.0 && store.lat < 53.0);
    }

    #[test]
    fn test_unknown_store_lookup() {
        assert!(get_store("999").is_none());
    }
}
