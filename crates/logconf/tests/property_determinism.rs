use logconf::catalog::fluentd::{Buffer, Format, KinesisStreamOutputConfig};
use logconf::{compile_block, compile_directive, Record, StatementKind, StaticSecretLoader};
use proptest::prelude::*;

#[derive(Debug, Clone, Record)]
#[conf(name = "tail")]
struct Tail {
    #[conf(tag = "omitempty")]
    path: String,
    #[conf(tag = "omitempty")]
    read_lines_limit: u32,
    #[conf(tag = "omitempty")]
    tags: Vec<String>,
    enabled: bool,
}

fn arb_word() -> impl Strategy<Value = String> {
    r"[a-z0-9_\-]{0,12}".prop_map(|s| s)
}

prop_compose! {
    fn arb_kinesis()(
        stream_name in r"[a-z]{1,12}",
        partition_key in arb_word(),
        region in arb_word(),
        retries in any::<u32>(),
        reset in proptest::option::of(any::<bool>()),
        with_format in any::<bool>(),
        with_buffer in any::<bool>(),
    ) -> KinesisStreamOutputConfig {
        KinesisStreamOutputConfig {
            stream_name,
            partition_key,
            region,
            retries_on_batch_request: retries,
            reset_backoff_if_success: reset,
            format: with_format.then(Format::default),
            buffer: with_buffer.then(Buffer::default),
            ..Default::default()
        }
    }
}

prop_compose! {
    fn arb_tail()(
        path in arb_word(),
        read_lines_limit in any::<u32>(),
        tags in proptest::collection::vec(arb_word(), 0..4),
        enabled in any::<bool>(),
    ) -> Tail {
        Tail { path, read_lines_limit, tags, enabled }
    }
}

proptest! {
    #[test]
    fn compiling_twice_is_byte_identical(config in arb_kinesis()) {
        let loader = StaticSecretLoader::new();
        let first = compile_directive(&loader, &config, "out1").unwrap().render();
        let second = compile_directive(&loader, &config, "out1").unwrap().render();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn keys_follow_declaration_order(config in arb_kinesis()) {
        let directive = compile_directive(&StaticSecretLoader::new(), &config, "out1").unwrap();
        let declared = [
            "stream_name",
            "partition_key",
            "region",
            "retries_on_batch_request",
            "reset_backoff_if_success",
        ];
        let positions: Vec<usize> = directive
            .params
            .keys()
            .map(|key| declared.iter().position(|d| *d == key).unwrap())
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        prop_assert_eq!(positions, sorted);
    }

    #[test]
    fn omitempty_fields_appear_only_when_set(tail in arb_tail()) {
        let block = compile_block(&StaticSecretLoader::new(), StatementKind::Source, "s1", &tail).unwrap();
        prop_assert_eq!(block.params.contains_key("path"), !tail.path.is_empty());
        prop_assert_eq!(block.params.contains_key("read-lines-limit"), tail.read_lines_limit != 0);
        prop_assert_eq!(block.params.contains_key("tags"), !tail.tags.is_empty());
        prop_assert!(block.params.contains_key("enabled"));

        let directive = compile_directive(&StaticSecretLoader::new(), &tail, "in").unwrap();
        prop_assert_eq!(directive.params.contains_key("read_lines_limit"), tail.read_lines_limit != 0);
    }
}
