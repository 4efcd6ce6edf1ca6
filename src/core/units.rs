/// Well-known tilted-ring parameters and their default unit labels.
pub const WELL_KNOWN_PARAMETERS: [(&str, &str); 13] = [
    ("VROT", "km s-1"),
    ("SBR", "Jy km s-1 arcsec-2"),
    ("INCL", "degrees"),
    ("PA", "degrees"),
    ("RADI", "arcsec"),
    ("Z0", "arcsec"),
    ("SDIS", "km s-1"),
    ("XPOS", "degrees"),
    ("YPOS", "degrees"),
    ("VSYS", "km s-1"),
    ("DVRO", "km s-1 arcsec-1"),
    ("DVRA", "km s-1 arcsec-1"),
    ("VRAD", "km s-1"),
];

pub const RADIUS_KEY: &str = "RADI";

/// Returns `true` when `name` is exactly one of the well-known parameters.
#[must_use]
pub fn is_well_known(name: &str) -> bool {
    WELL_KNOWN_PARAMETERS
        .iter()
        .any(|(known, _)| known.eq_ignore_ascii_case(name))
}

/// Parameter name without a disk suffix (`VROT_2` -> `VROT`).
#[must_use]
pub fn base_name(name: &str) -> &str {
    name.split('_').next().unwrap_or(name)
}

/// Default unit label, looked up by base name.
#[must_use]
pub fn default_unit(name: &str) -> Option<&'static str> {
    let base = base_name(name);
    WELL_KNOWN_PARAMETERS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(base))
        .map(|(_, unit)| *unit)
}

/// Rotation-curve parameters get velocity-specific fit settings.
#[must_use]
pub fn is_velocity_like(name: &str) -> bool {
    base_name(name).eq_ignore_ascii_case("VROT")
}
