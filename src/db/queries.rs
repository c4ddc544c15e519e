use anyhow::Context;
use chrono::NaiveDateTime;
use rusqlite::{params, params_from_iter, Connection};

use crate::models::booking::DATE_TIME_FORMAT;
use crate::models::{Booking, BookingStatus, Payment, VehicleType};

use super::store::{BillUpdate, BookingQuery};

const BOOKING_COLUMNS: &str = "id, name, phone, vehicle_type, service_type, booking_date, status, \
     payment_status, payment_method, amount, created_at";

// ── Bookings ──

pub fn insert_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    let booking_date = booking.booking_date.format(DATE_TIME_FORMAT).to_string();
    let created_at = booking.created_at.format(DATE_TIME_FORMAT).to_string();

    conn.execute(
        "INSERT INTO bookings (id, name, phone, vehicle_type, service_type, booking_date, status, payment_status, payment_method, amount, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            booking.id,
            booking.name,
            booking.phone,
            booking.vehicle_type.as_str(),
            booking.service_type,
            booking_date,
            booking.status.as_str(),
            booking.payment.status_str(),
            booking.payment.method_str(),
            booking.amount,
            created_at,
        ],
    )?;
    Ok(())
}

pub fn get_booking(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
        params![id],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Full result set for a query, newest booking date first.
pub fn list_bookings(conn: &Connection, query: &BookingQuery) -> anyhow::Result<Vec<Booking>> {
    let mut bookings = vec![];

    match &query.phone {
        Some(phone) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings WHERE phone = ?1 ORDER BY booking_date DESC, created_at DESC"
            ))?;
            let rows = stmt.query_map(params![phone], |row| Ok(parse_booking_row(row)))?;
            for row in rows {
                bookings.push(row??);
            }
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY booking_date DESC, created_at DESC"
            ))?;
            let rows = stmt.query_map([], |row| Ok(parse_booking_row(row)))?;
            for row in rows {
                bookings.push(row??);
            }
        }
    }

    Ok(bookings)
}

/// Overwrites the status. With `allowed_from`, the row is only touched when its current
/// status is the target itself or one of the listed predecessors.
pub fn update_booking_status(
    conn: &Connection,
    id: &str,
    status: BookingStatus,
    allowed_from: Option<&[BookingStatus]>,
) -> anyhow::Result<bool> {
    let mut sql = String::from("UPDATE bookings SET status = ?1 WHERE id = ?2");
    let mut values = vec![status.as_str().to_string(), id.to_string()];

    if let Some(from) = allowed_from {
        if from.is_empty() {
            sql.push_str(" AND status = ?1");
        } else {
            let placeholders = (0..from.len())
                .map(|i| format!("?{}", i + 3))
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(&format!(" AND (status = ?1 OR status IN ({placeholders}))"));
            values.extend(from.iter().map(|s| s.as_str().to_string()));
        }
    }

    let count = conn.execute(&sql, params_from_iter(values.iter()))?;
    Ok(count > 0)
}

pub fn update_booking_payment(conn: &Connection, id: &str, payment: &Payment) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET payment_status = ?1, payment_method = ?2 WHERE id = ?3",
        params![payment.status_str(), payment.method_str(), id],
    )?;
    Ok(count > 0)
}

pub fn set_booking_amount(conn: &Connection, id: &str, bill: &BillUpdate) -> anyhow::Result<bool> {
    let guard = if bill.only_if_unbilled {
        " AND amount IS NULL"
    } else {
        ""
    };

    let count = match &bill.payment {
        Some(payment) => conn.execute(
            &format!(
                "UPDATE bookings SET amount = ?1, payment_status = ?2, payment_method = ?3 WHERE id = ?4{guard}"
            ),
            params![bill.amount, payment.status_str(), payment.method_str(), id],
        )?,
        None => conn.execute(
            &format!("UPDATE bookings SET amount = ?1 WHERE id = ?2{guard}"),
            params![bill.amount, id],
        )?,
    };
    Ok(count > 0)
}

pub fn delete_booking(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM bookings WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let id: String = row.get(0)?;
    let name: String = row.get(1)?;
    let phone: String = row.get(2)?;
    let vehicle_type_str: String = row.get(3)?;
    let service_type: String = row.get(4)?;
    let booking_date_str: String = row.get(5)?;
    let status_str: String = row.get(6)?;
    let payment_status: String = row.get(7)?;
    let payment_method: String = row.get(8)?;
    let amount: Option<f64> = row.get(9)?;
    let created_at_str: String = row.get(10)?;

    let vehicle_type = VehicleType::parse(&vehicle_type_str)
        .with_context(|| format!("booking {id} has unknown vehicle type {vehicle_type_str:?}"))?;
    let status = BookingStatus::parse(&status_str)
        .with_context(|| format!("booking {id} has unknown status {status_str:?}"))?;
    let payment = Payment::from_parts(&payment_status, Some(&payment_method))
        .with_context(|| format!("booking {id} has inconsistent payment columns"))?;
    let booking_date = NaiveDateTime::parse_from_str(&booking_date_str, DATE_TIME_FORMAT)
        .with_context(|| format!("booking {id} has malformed booking_date"))?;
    let created_at = NaiveDateTime::parse_from_str(&created_at_str, DATE_TIME_FORMAT)
        .with_context(|| format!("booking {id} has malformed created_at"))?;

    Ok(Booking {
        id,
        name,
        phone,
        vehicle_type,
        service_type,
        booking_date,
        status,
        payment,
        amount,
        created_at,
    })
}
