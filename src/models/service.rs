use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Service {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

static CATALOG: [Service; 9] = [
    Service {
        id: "ppf",
        title: "PPF (Paint Protection Film)",
        description: "Protect your vehicle's paint from scratches, chips, and stains with our high-quality film.",
    },
    Service {
        id: "car-wash",
        title: "Car Wash",
        description: "A thorough exterior wash and dry, leaving your car spotless and gleaming.",
    },
    Service {
        id: "bike-wash",
        title: "Bike Wash",
        description: "A special wash for your bike to make it look brand new.",
    },
    Service {
        id: "spare-parts",
        title: "Spare Parts",
        description: "We provide genuine spare parts for your vehicle.",
    },
    Service {
        id: "bike-maintenance",
        title: "Bike Maintenance",
        description: "Complete maintenance service to keep your bike running smoothly.",
    },
    Service {
        id: "car-maintenance",
        title: "Car Maintenance",
        description: "Get your car serviced by our expert mechanics.",
    },
    Service {
        id: "engine-work",
        title: "Engine Work",
        description: "Expert engine diagnostics and repair services.",
    },
    Service {
        id: "puncture-repair",
        title: "Puncture Repair",
        description: "Quick and reliable puncture repair to get you back on the road.",
    },
    Service {
        id: "wheel-alignment",
        title: "Wheel Alignment",
        description: "Precision wheel alignment for better handling and tire life.",
    },
];

/// Services offered on the booking form. Bookings store the title as free text.
pub fn catalog() -> &'static [Service] {
    &CATALOG
}
