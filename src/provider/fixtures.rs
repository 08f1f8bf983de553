//! Seed data for the mock provider
//!
//! Deterministic records so development views and tests always see the
//! same data set.

use super::models::{
    CargoOwner, Coordinates, FreightBooking, Port, Route, Shipment, ShipmentDetail,
    ShippingCompany, TimelineEvent, VoyageProgress,
};

fn shipment(
    id: &str,
    tracking: &str,
    status: &str,
    origin: &str,
    destination: &str,
    eta: &str,
    cargo: &str,
) -> Shipment {
    Shipment {
        id: id.to_string(),
        tracking_number: tracking.to_string(),
        status: status.to_string(),
        origin: origin.to_string(),
        destination: destination.to_string(),
        estimated_arrival: eta.to_string(),
        cargo_type: cargo.to_string(),
        weight: None,
        volume: None,
        container_type: None,
        created_at: None,
        updated_at: None,
    }
}

/// Seed shipments, in tracking-number order.
pub fn shipments() -> Vec<Shipment> {
    vec![
        shipment(
            "1",
            "OFLP-2024-001",
            "In Transit",
            "Los Angeles",
            "Shanghai",
            "2024-01-15",
            "Electronics",
        ),
        shipment(
            "2",
            "OFLP-2024-002",
            "Loading",
            "Hamburg",
            "New York",
            "2024-01-20",
            "Automotive Parts",
        ),
        shipment(
            "3",
            "OFLP-2024-003",
            "Delivered",
            "Singapore",
            "Rotterdam",
            "2024-01-10",
            "Textiles",
        ),
    ]
}

/// Expand a seed shipment into its detail view.
pub fn shipment_detail(shipment: &Shipment) -> ShipmentDetail {
    let mut enriched = shipment.clone();
    enriched.weight = enriched.weight.or(Some(2500.0));
    enriched.volume = enriched.volume.or(Some(45.0));
    enriched.container_type = enriched
        .container_type
        .clone()
        .or_else(|| Some("20ft Standard".to_string()));

    let (ports, current_port, progress) = match shipment.status.as_str() {
        "Delivered" => (
            vec![shipment.origin.clone(), shipment.destination.clone()],
            shipment.destination.clone(),
            100,
        ),
        "Loading" => (
            vec![shipment.origin.clone(), shipment.destination.clone()],
            shipment.origin.clone(),
            0,
        ),
        _ => (
            vec![
                shipment.origin.clone(),
                "Yokohama".to_string(),
                shipment.destination.clone(),
            ],
            "Yokohama".to_string(),
            75,
        ),
    };

    ShipmentDetail {
        shipment: enriched,
        route: VoyageProgress {
            ports,
            current_port,
            progress,
        },
        timeline: vec![
            TimelineEvent {
                date: "2024-01-01".to_string(),
                event: "Cargo loaded".to_string(),
                location: shipment.origin.clone(),
            },
            TimelineEvent {
                date: "2024-01-05".to_string(),
                event: "Departed port".to_string(),
                location: shipment.origin.clone(),
            },
        ],
    }
}

fn port(id: &str, name: &str, code: &str, country: &str, city: &str, lat: f64, lon: f64) -> Port {
    Port {
        id: id.to_string(),
        name: name.to_string(),
        code: code.to_string(),
        country: country.to_string(),
        city: city.to_string(),
        coordinates: Coordinates {
            latitude: lat,
            longitude: lon,
        },
    }
}

/// Seed ports covering the seeded shipping lanes.
pub fn ports() -> Vec<Port> {
    vec![
        port("port-1", "Port of Los Angeles", "USLAX", "United States", "Los Angeles", 33.7361, -118.2614),
        port("port-2", "Port of Shanghai", "CNSHA", "China", "Shanghai", 31.2304, 121.4737),
        port("port-3", "Port of Hamburg", "DEHAM", "Germany", "Hamburg", 53.5461, 9.9661),
        port("port-4", "Port of New York", "USNYC", "United States", "New York", 40.6848, -74.0115),
        port("port-5", "Port of Singapore", "SGSIN", "Singapore", "Singapore", 1.2644, 103.8220),
        port("port-6", "Port of Rotterdam", "NLRTM", "Netherlands", "Rotterdam", 51.9516, 4.0536),
    ]
}

fn route(
    id: &str,
    name: &str,
    origin: &str,
    destination: &str,
    distance: f64,
    days: u32,
) -> Route {
    Route {
        id: id.to_string(),
        name: name.to_string(),
        origin_port_id: origin.to_string(),
        destination_port_id: destination.to_string(),
        distance,
        estimated_duration: days,
        is_active: true,
    }
}

/// Seed routes, one per seeded shipping lane.
pub fn routes() -> Vec<Route> {
    vec![
        route("route-1", "Transpacific Eastbound", "port-1", "port-2", 5708.0, 14),
        route("route-2", "North Atlantic", "port-3", "port-4", 3675.0, 9),
        route("route-3", "Asia-Europe", "port-5", "port-6", 8288.0, 21),
    ]
}

/// Seed cargo owners.
pub fn cargo_owners() -> Vec<CargoOwner> {
    vec![
        CargoOwner {
            id: "owner-1".to_string(),
            name: "Mei Chen".to_string(),
            email: "mei.chen@pacifictrading.example".to_string(),
            phone: "+1-310-555-0142".to_string(),
            address: "412 Harbor Blvd, Los Angeles, CA".to_string(),
            company_name: "Pacific Trading Co".to_string(),
        },
        CargoOwner {
            id: "owner-2".to_string(),
            name: "Jonas Weber".to_string(),
            email: "jweber@rheinexport.example".to_string(),
            phone: "+49-40-555-0199".to_string(),
            address: "Speicherstadt 7, Hamburg".to_string(),
            company_name: "Rhein Export GmbH".to_string(),
        },
    ]
}

/// Seed shipping companies.
pub fn shipping_companies() -> Vec<ShippingCompany> {
    vec![
        ShippingCompany {
            id: "company-1".to_string(),
            name: "Meridian Lines".to_string(),
            code: "MERL".to_string(),
            email: "ops@meridianlines.example".to_string(),
            phone: "+65-6555-0117".to_string(),
            address: "1 Maritime Square, Singapore".to_string(),
            fleet_size: 48,
        },
        ShippingCompany {
            id: "company-2".to_string(),
            name: "Atlantic Carriers".to_string(),
            code: "ATLC".to_string(),
            email: "bookings@atlanticcarriers.example".to_string(),
            phone: "+31-10-555-0163".to_string(),
            address: "Wilhelminakade 909, Rotterdam".to_string(),
            fleet_size: 27,
        },
    ]
}

/// Seed freight bookings.
pub fn freight_bookings() -> Vec<FreightBooking> {
    vec![
        FreightBooking {
            id: "booking-1".to_string(),
            cargo_owner_id: "owner-1".to_string(),
            shipping_company_id: "company-1".to_string(),
            route_id: "route-1".to_string(),
            status: "Confirmed".to_string(),
            booking_date: "2023-12-20".to_string(),
            departure_date: "2024-01-05".to_string(),
            arrival_date: "2024-01-19".to_string(),
            total_cost: 18400.0,
            currency: "USD".to_string(),
        },
        FreightBooking {
            id: "booking-2".to_string(),
            cargo_owner_id: "owner-2".to_string(),
            shipping_company_id: "company-2".to_string(),
            route_id: "route-2".to_string(),
            status: "Pending".to_string(),
            booking_date: "2024-01-02".to_string(),
            departure_date: "2024-01-11".to_string(),
            arrival_date: "2024-01-20".to_string(),
            total_cost: 9150.0,
            currency: "EUR".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_shipments_are_deterministic() {
        assert_eq!(shipments(), shipments());

        let seeded = shipments();
        assert_eq!(seeded.len(), 3);
        assert_eq!(seeded[0].tracking_number, "OFLP-2024-001");
        assert_eq!(seeded[0].status, "In Transit");
        assert_eq!(seeded[2].tracking_number, "OFLP-2024-003");
        assert_eq!(seeded[2].status, "Delivered");
    }

    #[test]
    fn test_shipment_detail_enrichment() {
        let seeded = shipments();
        let detail = shipment_detail(&seeded[0]);

        assert_eq!(detail.shipment.id, "1");
        assert_eq!(detail.route.current_port, "Yokohama");
        assert_eq!(detail.route.progress, 75);
        assert!(detail.shipment.weight.is_some());
        assert!(!detail.timeline.is_empty());
    }

    #[test]
    fn test_delivered_detail_is_complete() {
        let seeded = shipments();
        let detail = shipment_detail(&seeded[2]);

        assert_eq!(detail.route.progress, 100);
        assert_eq!(detail.route.current_port, "Rotterdam");
    }

    #[test]
    fn test_route_ports_exist() {
        let port_ids: Vec<String> = ports().into_iter().map(|p| p.id).collect();
        for route in routes() {
            assert!(port_ids.contains(&route.origin_port_id));
            assert!(port_ids.contains(&route.destination_port_id));
        }
    }

    #[test]
    fn test_booking_references_exist() {
        let owner_ids: Vec<String> = cargo_owners().into_iter().map(|o| o.id).collect();
        let company_ids: Vec<String> = shipping_companies().into_iter().map(|c| c.id).collect();
        let route_ids: Vec<String> = routes().into_iter().map(|r| r.id).collect();

        for booking in freight_bookings() {
            assert!(owner_ids.contains(&booking.cargo_owner_id));
            assert!(company_ids.contains(&booking.shipping_company_id));
            assert!(route_ids.contains(&booking.route_id));
        }
    }
}
