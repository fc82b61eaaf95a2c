impl std::fmt::Display for ${1:Type} {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${2}")
    }
}
