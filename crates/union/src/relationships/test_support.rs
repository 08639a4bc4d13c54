//! Shared fixtures for unit tests

use serde::Serialize;

use crate::model::{Model, Morph, TypeTag};

/// Owner model used across unit tests
#[derive(Debug, Clone, PartialEq)]
pub struct Garage {
    pub id: Option<i64>,
}

impl Garage {
    pub fn new(id: i64) -> Self {
        Self { id: Some(id) }
    }
}

impl Model for Garage {
    type PrimaryKey = i64;

    fn table_name() -> &'static str {
        "garages"
    }

    fn primary_key(&self) -> Option<Self::PrimaryKey> {
        self.id
    }
}

/// Vehicle records; an e-bike is-a bike
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "id")]
pub enum Vehicle {
    Car(u32),
    Bike(u32),
    EBike(u32),
    Bicycle(u32),
}

impl Vehicle {
    pub fn car(id: u32) -> Self {
        Vehicle::Car(id)
    }

    pub fn bike(id: u32) -> Self {
        Vehicle::Bike(id)
    }

    pub fn ebike(id: u32) -> Self {
        Vehicle::EBike(id)
    }

    pub fn bicycle(id: u32) -> Self {
        Vehicle::Bicycle(id)
    }
}

impl Morph for Vehicle {
    fn morph_type(&self) -> TypeTag {
        match self {
            Vehicle::Car(_) => TypeTag::new("Car"),
            Vehicle::Bike(_) => TypeTag::new("Bike"),
            Vehicle::EBike(_) => TypeTag::new("EBike"),
            Vehicle::Bicycle(_) => TypeTag::new("Bicycle"),
        }
    }

    fn morph_lineage(&self) -> Vec<TypeTag> {
        match self {
            Vehicle::EBike(_) => vec![TypeTag::new("EBike"), TypeTag::new("Bike")],
            other => vec![other.morph_type()],
        }
    }
}

/// Ingredient records for single-reference unions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Ingredient {
    Meat(u32),
    Veg(u32),
    Spice(u32),
}

impl Ingredient {
    pub fn meat(id: u32) -> Self {
        Ingredient::Meat(id)
    }

    pub fn veg(id: u32) -> Self {
        Ingredient::Veg(id)
    }

    pub fn spice(id: u32) -> Self {
        Ingredient::Spice(id)
    }
}

impl Morph for Ingredient {
    fn morph_type(&self) -> TypeTag {
        match self {
            Ingredient::Meat(_) => TypeTag::new("Meat"),
            Ingredient::Veg(_) => TypeTag::new("Veg"),
            Ingredient::Spice(_) => TypeTag::new("Spice"),
        }
    }
}
