pub mod booking;
pub mod payment;
pub mod service;

pub use booking::{Booking, BookingStatus, NewBooking, VehicleType};
pub use payment::{Payment, PaymentMethod};
pub use service::Service;
