//! Plain-text output for the CLI.

use ward_core::operations::vitals::VitalsObservation;
use ward_core::{Census, Patient, RoomSummary};

pub fn room_line(room: &RoomSummary) {
    let occupied = room.beds.iter().filter(|b| b.occupant.is_some()).count();
    println!(
        "{:<8} {:<15} {:<18} {:<7} {}/{} beds  {}",
        room.id.as_str(),
        room.kind.as_str(),
        room.department,
        room.floor.as_str(),
        occupied,
        room.capacity,
        room.status
    );
}

pub fn room_details(room: &RoomSummary) {
    println!("Room:       {}", room.id);
    println!("Type:       {}", room.kind);
    println!("Department: {}", room.department);
    println!("Floor:      {}", room.floor);
    println!("Condition:  {}", room.condition);
    println!("Status:     {}", room.status);
    if room.beds.is_empty() {
        println!("No beds.");
    }
    for bed in &room.beds {
        match (&bed.occupant, &bed.occupant_name) {
            (Some(id), Some(name)) => println!("  {:<10} {} ({})", bed.bed.to_string(), name, id),
            (Some(id), None) => println!("  {:<10} {}", bed.bed.to_string(), id),
            _ => println!("  {:<10} free", bed.bed.to_string()),
        }
    }
}

pub fn census(census: &Census) {
    match &census.floor {
        Some(floor) => println!("Census for floor {floor}"),
        None => println!("Census for all floors"),
    }
    println!("Rooms:              {}", census.rooms);
    println!("  available:        {}", census.available);
    println!("  partially-occupied: {}", census.partially_occupied);
    println!("  occupied:         {}", census.occupied);
    println!("  maintenance:      {}", census.maintenance);
    println!("  cleaning:         {}", census.cleaning);
    println!(
        "Beds:               {} occupied of {} ({} free in service)",
        census.occupied_beds, census.beds, census.free_beds
    );
    println!("Occupancy:          {:.1}%", census.occupancy_rate * 100.0);
}

pub fn patient_line(patient: &Patient) {
    println!(
        "{:<6} {:<24} {:<11} {:<18} {}",
        patient.id.as_str(),
        patient.name.as_str(),
        patient.status.as_str(),
        patient.department.as_deref().unwrap_or("-"),
        patient
            .bed
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "-".into())
    );
}

pub fn patient_details(patient: &Patient) {
    println!("ID:         {}", patient.id);
    println!("Name:       {}", patient.name);
    println!("Age:        {}", patient.age);
    println!("Gender:     {}", patient.gender);
    println!("Status:     {}", patient.status);
    if let Some(department) = &patient.department {
        println!("Department: {department}");
    }
    if let Some(bed) = &patient.bed {
        println!("Bed:        {bed}");
    }
    if let Some(attending) = &patient.attending {
        println!("Attending:  {attending}");
    }
    if let Some(phone) = &patient.phone {
        println!("Phone:      {phone}");
    }
    if let Some(email) = &patient.email {
        println!("Email:      {email}");
    }
    if let Some(group) = patient.blood_group {
        println!("Blood:      {group}");
    }
    if !patient.allergies.is_empty() {
        println!("Allergies:  {}", patient.allergies.join(", "));
    }
    if !patient.conditions.is_empty() {
        println!("Conditions: {}", patient.conditions.join(", "));
    }
    if let Some(at) = patient.admitted_at {
        println!("Admitted:   {}", at.format("%Y-%m-%d %H:%M"));
    }
    if let Some(at) = patient.discharged_at {
        println!("Discharged: {}", at.format("%Y-%m-%d %H:%M"));
    }
}

pub fn observation(obs: &VitalsObservation) {
    let p = &obs.payload;
    let mut readings = Vec::new();
    if let Some(t) = &p.temperature {
        readings.push(format!("temp {}{}", t.value, t.unit));
    }
    if let Some(bp) = &p.blood_pressure {
        readings.push(format!("bp {bp}"));
    }
    if let Some(hr) = p.heart_rate {
        readings.push(format!("hr {hr}"));
    }
    if let Some(rr) = p.respiratory_rate {
        readings.push(format!("rr {rr}"));
    }
    if let Some(spo2) = p.oxygen_saturation {
        readings.push(format!("spo2 {spo2}%"));
    }
    if let Some(pain) = p.pain_score {
        readings.push(format!("pain {pain}/10"));
    }
    if let Some(w) = p.weight_kg {
        readings.push(format!("weight {w}kg"));
    }
    if let Some(h) = p.height_cm {
        readings.push(format!("height {h}cm"));
    }
    println!(
        "{}  {}  by {}: {}",
        obs.id.timestamp().format("%Y-%m-%d %H:%M"),
        obs.patient,
        obs.recorder,
        readings.join(", ")
    );
    for flag in &obs.flags {
        println!("  ! {flag}");
    }
}
