//! Test fixtures: seeded storage records and loopback printers

use std::collections::VecDeque;

use shared::models::{Business, Category, PrintTicket, PrinterDevice, PrinterZone, TicketStatus};
use shared::util::{new_uuid, now_millis, snowflake_id};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use super::storage::PrintStorage;

/// Loopback printer collecting every non-empty job it receives
pub async fn fake_printer() -> (u16, mpsc::UnboundedReceiver<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let _ = socket.read_to_end(&mut buf).await;
                // probes connect and close without data
                if !buf.is_empty() {
                    let _ = tx.send(buf);
                }
            });
        }
    });

    (port, rx)
}

/// A loopback port nobody listens on
pub fn dead_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

pub fn seed_business(storage: &PrintStorage, id: i64, code: &str, name: &str) -> Business {
    let business = Business {
        id,
        code: code.to_string(),
        name: name.to_string(),
    };
    storage.upsert_business(&business).unwrap();
    business
}

pub fn seed_category(storage: &PrintStorage, id: i64, business_id: i64, name: &str) -> Category {
    let category = Category {
        id,
        business_id,
        name: name.to_string(),
    };
    storage.upsert_category(&category).unwrap();
    category
}

/// Active zone printing to 127.0.0.1:`port`
pub fn seed_zone(
    storage: &PrintStorage,
    business_id: i64,
    name: &str,
    port: u16,
    category_ids: Vec<i64>,
) -> PrinterZone {
    let now = now_millis();
    let zone = PrinterZone {
        id: snowflake_id(),
        business_id,
        name: name.to_string(),
        printer_ip: "127.0.0.1".to_string(),
        printer_port: port,
        active: true,
        category_ids,
        created_at: now,
        updated_at: now,
    };
    let txn = storage.begin_write().unwrap();
    storage.store_zone(&txn, &zone).unwrap();
    txn.commit().unwrap();
    zone
}

pub fn seed_ticket(storage: &PrintStorage, zone: &PrinterZone, content: &[u8]) -> PrintTicket {
    let now = now_millis();
    let ticket = PrintTicket {
        id: snowflake_id(),
        ticket_id: new_uuid(),
        business_id: zone.business_id,
        order_id: "order-1".to_string(),
        printer_zone_id: zone.id,
        status: TicketStatus::Pending,
        retry_count: 0,
        last_error: None,
        content_len: content.len(),
        created_at: now,
        updated_at: now,
    };
    let txn = storage.begin_write().unwrap();
    storage.create_ticket(&txn, &ticket, content).unwrap();
    txn.commit().unwrap();
    ticket
}

pub fn seed_device(
    storage: &PrintStorage,
    device_id: &str,
    business_id: i64,
    printer_ip: Option<&str>,
    ip_address: Option<&str>,
) -> PrinterDevice {
    storage
        .upsert_device(device_id, |_| PrinterDevice {
            device_id: device_id.to_string(),
            business_id,
            name: None,
            ip_address: ip_address.map(String::from),
            printer_ip: printer_ip.map(String::from),
            mac_address: None,
            firmware_version: None,
            online: false,
            last_seen: None,
            connection_history: VecDeque::new(),
            created_at: 0,
            updated_at: 0,
        })
        .unwrap()
}
