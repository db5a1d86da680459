/// Element number of sulfur, used by the bond-order normalization rules.
pub const SULFUR: u8 = 16;

const SYMBOLS: &[&str] = &[
    "X", // 0: unknown / placeholder
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", //
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca", //
    "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", //
    "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", //
    "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn", //
    "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", //
    "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb", //
    "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", //
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", //
    "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm", //
    "Md", "No", "Lr",
];

/// Returns the chemical symbol for an element number, or `"X"` when the
/// number is outside the known range.
pub fn symbol(element: u8) -> &'static str {
    SYMBOLS.get(element as usize).copied().unwrap_or("X")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_maps_common_elements() {
        assert_eq!(symbol(1), "H");
        assert_eq!(symbol(6), "C");
        assert_eq!(symbol(8), "O");
        assert_eq!(symbol(SULFUR), "S");
    }

    #[test]
    fn symbol_falls_back_for_out_of_range_numbers() {
        assert_eq!(symbol(0), "X");
        assert_eq!(symbol(200), "X");
    }
}
