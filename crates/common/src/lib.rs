pub mod types;
pub mod utils;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok", version: "0.0.0" };
        assert_eq!(h.status, "ok");
    }
}
