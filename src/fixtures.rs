#[cfg(test)]
pub mod test {
    use std::sync::{Arc, LazyLock};

    use confique::Config;
    use serde::{Deserialize, Serialize};
    use serde_json::{Value, json};

    use crate::coerce;
    use crate::error::FieldError;
    use crate::report::ErrorMapping;
    use crate::schema::{Attribute, Collection, Component, Schema};
    use crate::target::{Accessible, Accessors, Configurable, Target};
    use crate::types::{Key, TypeTag};

    // -- confique-derived schema fixtures ----------------------------------------

    #[derive(Config, Serialize, Deserialize, Debug, PartialEq)]
    pub struct TestConfig {
        /// The application host.
        #[config(default = "localhost")]
        pub host: String,

        /// The port number.
        #[config(default = 8080)]
        pub port: u16,

        /// Enable debug mode.
        #[config(default = false)]
        pub debug: bool,

        /// Database settings.
        #[config(nested)]
        pub database: TestDbConfig,
    }

    #[derive(Config, Serialize, Deserialize, Debug, PartialEq)]
    pub struct TestDbConfig {
        /// Connection string URL.
        pub url: Option<String>,

        /// Connection pool size.
        #[config(default = 5)]
        pub pool_size: usize,
    }

    // -- Declared schemas ---------------------------------------------------------

    pub fn position_schema() -> Arc<Schema> {
        Schema::builder()
            .typed("x", TypeTag::Integer)
            .typed("y", TypeTag::Integer)
            .build()
            .unwrap()
    }

    pub fn server_schema() -> Arc<Schema> {
        Schema::builder()
            .attribute(Attribute::new("name").description("Name of the server."))
            .attribute(
                Attribute::new("port")
                    .of(TypeTag::Integer)
                    .default(5000)
                    .description("Port to listen on."),
            )
            .attribute(Attribute::new("perhaps").default(Value::Null))
            .component(
                Component::new("position")
                    .schema(&position_schema())
                    .description("Where the server sits."),
            )
            .collection(
                Collection::dict("services")
                    .with(|s| s.attribute("image").typed("port", TypeTag::Integer))
                    .description("Services to run, by name."),
            )
            .attribute("words")
            .build()
            .unwrap()
    }

    // -- Plain objects exposing accessors -----------------------------------------

    fn coordinate(value: Value) -> Result<i64, FieldError> {
        let coerced = coerce::integer(&value)?;
        coerced
            .as_i64()
            .ok_or_else(|| FieldError::invalid(format!("{coerced} is out of range")))
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Position {
        pub x: Option<i64>,
        pub y: Option<i64>,
    }

    static POSITION: LazyLock<Accessors<Position>> = LazyLock::new(|| {
        Accessors::<Position>::new()
            .accessor(
                "x",
                |p| json!(p.x),
                |p, v| {
                    p.x = Some(coordinate(v)?);
                    Ok(())
                },
            )
            .accessor(
                "y",
                |p| json!(p.y),
                |p, v| {
                    p.y = Some(coordinate(v)?);
                    Ok(())
                },
            )
    });

    impl Accessible for Position {
        fn accessors() -> &'static Accessors<Self> {
            &POSITION
        }
    }

    impl Configurable for Position {
        fn to_plain_data(&self) -> Option<Value> {
            Some(json!({"x": self.x, "y": self.y}))
        }
    }

    /// A read-only `position` object next to a plain `orientation` attribute.
    #[derive(Debug, Default)]
    pub struct State {
        pub position: Position,
        pub orientation: Value,
    }

    impl Accessible for State {
        fn accessors() -> &'static Accessors<Self> {
            static ACCESSORS: LazyLock<Accessors<State>> = LazyLock::new(|| {
                Accessors::<State>::new()
                    .accessor(
                        "orientation",
                        |s| s.orientation.clone(),
                        |s, v| {
                            s.orientation = v;
                            Ok(())
                        },
                    )
                    .nested(
                        "position",
                        |s| json!({"x": s.position.x, "y": s.position.y}),
                        |s| &mut s.position,
                    )
            });
            &ACCESSORS
        }
    }

    /// Two attributes that accept any value, including nested ones.
    #[derive(Debug, Default)]
    pub struct Thing {
        pub foo: Value,
        pub bar: Value,
    }

    impl Accessible for Thing {
        fn accessors() -> &'static Accessors<Self> {
            static ACCESSORS: LazyLock<Accessors<Thing>> = LazyLock::new(|| {
                Accessors::<Thing>::new()
                    .accessor(
                        "foo",
                        |t| t.foo.clone(),
                        |t, v| {
                            t.foo = v;
                            Ok(())
                        },
                    )
                    .accessor(
                        "bar",
                        |t| t.bar.clone(),
                        |t, v| {
                            t.bar = v;
                            Ok(())
                        },
                    )
            });
            &ACCESSORS
        }
    }

    /// A required `size` and a free-form `colour`, with no plain-data form.
    #[derive(Debug, Default, PartialEq)]
    pub struct Shirt {
        pub size: Option<String>,
        pub colour: Value,
    }

    impl Accessible for Shirt {
        fn accessors() -> &'static Accessors<Self> {
            static ACCESSORS: LazyLock<Accessors<Shirt>> = LazyLock::new(|| {
                Accessors::<Shirt>::new()
                    .accessor(
                        "size",
                        |s| json!(s.size),
                        |s, v| {
                            let size = coerce::string(&v)?;
                            s.size = size.as_str().map(str::to_string);
                            Ok(())
                        },
                    )
                    .accessor(
                        "colour",
                        |s| s.colour.clone(),
                        |s, v| {
                            s.colour = v;
                            Ok(())
                        },
                    )
            });
            &ACCESSORS
        }
    }

    impl Configurable for Shirt {
        fn config_errors(&self) -> ErrorMapping {
            let mut errors = ErrorMapping::new();
            if self.size.is_none() {
                errors.insert(".size".to_string(), FieldError::NoValueProvided);
            }
            errors
        }
    }

    /// A read-only keyed collection that creates a [`Position`] on first access.
    #[derive(Debug, Default)]
    pub struct NamedPositions {
        entries: Vec<(String, Position)>,
    }

    impl NamedPositions {
        pub fn get(&self, name: &str) -> Option<&Position> {
            self.entries
                .iter()
                .find(|(existing, _)| existing == name)
                .map(|(_, position)| position)
        }

        fn entry(&mut self, name: String) -> &mut Position {
            let index = match self.entries.iter().position(|(existing, _)| *existing == name) {
                Some(index) => index,
                None => {
                    self.entries.push((name, Position::default()));
                    self.entries.len() - 1
                }
            };
            &mut self.entries[index].1
        }
    }

    impl Target for NamedPositions {
        fn path(&self, key: &Key) -> String {
            key.entry_path()
        }

        fn get(&self, key: &Key) -> Result<Value, FieldError> {
            Ok(NamedPositions::get(self, &key.to_string())
                .map(|p| json!({"x": p.x, "y": p.y}))
                .unwrap_or(Value::Null))
        }

        fn set(&mut self, key: &Key, _value: Value) -> Result<(), FieldError> {
            Err(FieldError::AttributeNotFound(key.to_string()))
        }

        fn can_set(&self, _key: &Key) -> bool {
            false
        }

        fn has_nested(&self, _key: &Key) -> bool {
            true
        }

        fn nested_mut(&mut self, key: &Key) -> Result<Option<&mut dyn Target>, FieldError> {
            let position: &mut dyn Target = self.entry(key.to_string());
            Ok(Some(position))
        }
    }

    #[test]
    fn test_config_loads_defaults() {
        let config = TestConfig::builder().load().unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 8080);
        assert!(!config.debug);
        assert_eq!(config.database.url, None);
        assert_eq!(config.database.pool_size, 5);
    }

    #[test]
    fn accessor_table_is_built_once() {
        assert!(std::ptr::eq(Position::accessors(), Position::accessors()));
    }

    #[test]
    fn server_schema_builds() {
        let schema = server_schema();
        assert_eq!(schema.declarations().len(), 6);
    }
}
