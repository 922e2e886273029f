//! Fixed lookup tables for Booking.com sustainability data.
//!
//! Booking exposes sustainability practices as numeric facility ids inside an
//! embedded JSON blob. Each id maps to a block key (`pp_sustainability_block_*`),
//! and each block key has the Spanish description shown on the listing.

/// Indicator identifier -> block key prefix it aggregates.
pub const SUSTAINABILITY_BLOCKS: &[(&str, &str)] = &[
    ("Booking_Certificados_Sostenibilidad", "pp_sustainability_cert"),
    ("Booking_Residuos", "pp_sustainability_block_waste"),
    ("Booking_Agua", "pp_sustainability_block_water"),
    ("Booking_Energía", "pp_sustainability_block_greenhouse"),
    ("Booking_Destino", "pp_sustainability_block_community"),
    ("Booking_Naturaleza", "pp_sustainability_block_eco"),
];

/// Facility id -> block key.
pub const FACILITIES: &[(&str, &str)] = &[
    ("182", "pp_sustainability_block_greenhouse_electric_car"),
    ("426", "pp_sustainability_block_greenhouse_bike_parking"),
    ("435", "pp_sustainability_block_waste_mini_toil"),
    ("436", "pp_sustainability_block_water_towel"),
    ("439", "pp_sustainability_block_waste_straw"),
    ("440", "pp_sustainability_block_waste_reusable_cups"),
    ("441", "pp_sustainability_block_waste_water_bottle"),
    ("442", "pp_sustainability_block_waste_drink_bottle"),
    ("443", "pp_sustainability_block_waste_plates"),
    ("444", "pp_sustainability_block_greenhouse_keycard"),
    ("445", "pp_sustainability_block_water_cleaning"),
    ("446", "pp_sustainability_block_waste_water_cooler"),
    ("447", "pp_sustainability_block_greenhouse_bike_rent"),
    ("448", "pp_sustainability_block_waste_stirrer"),
    ("489", "pp_sustainability_block_eco_wildlife"),
    ("490", "pp_sustainability_block_waste_bins"),
    ("491", "pp_sustainability_block_greenhouse_seasonal_food"),
    ("492", "pp_sustainability_block_greenhouse_lights"),
    ("493", "pp_sustainability_block_water_toilet"),
    ("494", "pp_sustainability_block_water_shower"),
    ("495", "pp_sustainability_block_greenhouse_window"),
    ("496", "pp_sustainability_block_waste_food"),
    ("497", "pp_sustainability_block_community_invest"),
    ("498", "pp_sustainability_block_greenhouse_carbon"),
    ("499", "pp_sustainability_block_community_tours"),
    ("502", "pp_sustainability_block_eco_green_space"),
    ("503", "pp_sustainability_block_eco_organic_food"),
    ("504", "pp_sustainability_block_greenhouse_energy"),
    ("505", "pp_sustainability_block_community_art"),
    ("506", "pp_sustainability_block_community_ecosystem"),
];

/// Derived column suffix (block key without `pp_sustainability_block_`) -> description.
const DESCRIPTIONS: &[(&str, &str)] = &[
    ("community_art", "Los artistas locales pueden exponer sus obras aquí"),
    ("community_ecosystem", "El alojamiento proporciona información sobre los ecosistemas, el patrimonio y la cultura locales, y sobre el comportamiento esperado"),
    ("community_invest", "El alojamiento invierte un porcentaje de los ingresos en proyectos de sostenibilidad o de la comunidad"),
    ("community_tours", "Se ofrecen tours y actividades organizados por empresas y guías locales"),
    ("eco_green_space", "El alojamiento tiene espacios verdes, como jardín o azotea verde"),
    ("eco_organic_food", "La mayoría de la comida que se sirve es ecológica"),
    ("eco_wildlife", "No se exhiben ni se interactúa con animales salvajes (no domesticados) mantenidos en cautividad en el alojamiento, tampoco se consumen, se venden ni se cazan o matan con otros fines"),
    ("greenhouse_bike_parking", "Hay parking de bicicletas"),
    ("greenhouse_bike_rent", "Se alquilan bicicletas"),
    ("greenhouse_carbon", "El alojamiento compensa una parte de su huella de carbono"),
    ("greenhouse_electric_car", "Hay un punto de carga para coches eléctricos"),
    ("greenhouse_energy", "Toda la electricidad procede de energías renovables"),
    ("greenhouse_keycard", "La electricidad funciona con sensor de movimiento o tarjeta"),
    ("greenhouse_lights", "La mayoría de las luces del alojamiento usan bombillas LED (de bajo consumo)"),
    ("greenhouse_seasonal_food", "La mayoría de la comida del alojamiento procede de la zona"),
    ("greenhouse_window", "Todas las ventanas son de doble acristalamiento"),
    ("waste_bins", "Hay papeleras de reciclaje a disposición de los clientes y la basura se recicla"),
    ("waste_drink_bottle", "No se utilizan botellas de bebidas de plástico de un solo uso"),
    ("waste_food", "El alojamiento trata de reducir el desperdicio alimentario"),
    ("waste_mini_toil", "No se utilizan botes mini de plástico de un solo uso para el champú, el acondicionador ni el gel de baño"),
    ("waste_plates", "No se utilizan cubiertos ni vajilla de plástico de un solo uso"),
    ("waste_reusable_cups", "No se utilizan vasos de plástico de un solo uso"),
    ("waste_stirrer", "No se utilizan cucharillas de plástico de un solo uso"),
    ("waste_straw", "No se utilizan pajitas de plástico de un solo uso"),
    ("waste_water_bottle", "No se utilizan botellas de agua de plástico de un solo uso"),
    ("waste_water_cooler", "Hay dispensador/refrigerador de agua"),
    ("water_cleaning", "Se puede renunciar a la limpieza diaria de la habitación"),
    ("water_shower", "Las duchas usan poca agua"),
    ("water_toilet", "Los WC usan poca agua"),
    ("water_towel", "Se pueden reutilizar las toallas"),
];

const BLOCK_PREFIX: &str = "pp_sustainability_block_";

/// Context columns of the parser output that get split into 0/1 columns.
pub const SPLIT_CONTEXTS: &[(&str, &str)] = &[
    ("Booking_Agua_Contexto", "water_"),
    ("Booking_Destino_Contexto", "community_"),
    ("Booking_Energía_Contexto", "greenhouse_"),
    ("Booking_Naturaleza_Contexto", "eco_"),
    ("Booking_Residuos_Contexto", "waste_"),
];

pub fn block_prefix(indicator: &str) -> Option<&'static str> {
    lookup(SUSTAINABILITY_BLOCKS, indicator)
}

pub fn facility_block(id: &str) -> Option<&'static str> {
    lookup(FACILITIES, id)
}

/// Description shown on Booking for a block key.
pub fn block_description(block: &str) -> Option<&'static str> {
    lookup(DESCRIPTIONS, block.strip_prefix(BLOCK_PREFIX)?)
}

/// The 30 derived indicator columns, in alphabetical order.
pub fn indicator_columns() -> impl Iterator<Item = &'static str> {
    DESCRIPTIONS.iter().map(|(column, _)| *column)
}

/// `(description, derived column)` pairs for a split context column.
pub fn splits_for(context_column: &str) -> Vec<(&'static str, &'static str)> {
    let Some(prefix) = lookup(SPLIT_CONTEXTS, context_column) else {
        return Vec::new();
    };
    DESCRIPTIONS
        .iter()
        .filter(|(column, _)| column.starts_with(prefix))
        .map(|(column, text)| (*text, *column))
        .collect()
}

fn lookup(table: &[(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_facility_has_a_description() {
        for (id, block) in FACILITIES {
            assert!(block_description(block).is_some(), "facility {} has no text", id);
        }
    }

    #[test]
    fn splits_cover_every_indicator_column_once() {
        let mut columns: Vec<&str> = SPLIT_CONTEXTS
            .iter()
            .flat_map(|(context, _)| splits_for(context))
            .map(|(_, column)| column)
            .collect();
        columns.sort();
        assert_eq!(columns, indicator_columns().collect::<Vec<_>>());
        assert_eq!(columns.len(), 30);
    }

    #[test]
    fn water_split_lists_four_practices() {
        let splits = splits_for("Booking_Agua_Contexto");
        assert_eq!(splits.len(), 4);
        assert!(splits.contains(&("Los WC usan poca agua", "water_toilet")));
    }

    #[test]
    fn lookups() {
        assert_eq!(facility_block("436"), Some("pp_sustainability_block_water_towel"));
        assert_eq!(facility_block("999"), None);
        assert_eq!(block_prefix("Booking_Agua"), Some("pp_sustainability_block_water"));
        assert_eq!(
            block_description("pp_sustainability_block_water_towel"),
            Some("Se pueden reutilizar las toallas")
        );
    }
}
