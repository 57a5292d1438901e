//! Integration tests for bemforge.
//!
//! These drive the public API end to end: register templates on a [`Bh`],
//! apply them to BEMJSON input, and compare the rendered HTML.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use bemforge::{
    AttrValue, Attrs, Bh, Context, ElementNode, Error, JsAttrScheme, LoopScope, Mods, Naming,
    Node, Options, Template,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn bh_with(options: Options) -> Bh {
    Bh::with_options(options).unwrap()
}

fn attrs<const N: usize>(pairs: [(&str, AttrValue); N]) -> Attrs {
    pairs.into_iter().map(|(k, v)| (k.to_owned(), v)).collect()
}

fn mark_edges(ctx: &mut Context<'_>) {
    if ctx.is_first() {
        ctx.set_mod("first", "yes", false);
    }
    if ctx.is_last() {
        ctx.set_mod("last", "yes", false);
    }
}

// ---------------------------------------------------------------------------
// Plain rendering
// ---------------------------------------------------------------------------

#[test]
fn test_block_without_templates() {
    let bh = Bh::new();
    insta::assert_snapshot!(bh.apply(json!({"block": "button"})).unwrap(), @r#"<div class="button"></div>"#);
}

#[test]
fn test_falsy_items_render_nothing() {
    let bh = Bh::new();
    let html = bh
        .apply(json!([false, null, [], "", {"content": false}, {"tag": false}]))
        .unwrap();
    assert_eq!(html, "<div></div>");
}

#[test]
fn test_self_closing_tag() {
    let mut bh = Bh::new();
    bh.register("image", |ctx| {
        ctx.set_tag("img", false).set_attr("src", "a.png", false);
        Ok(None)
    });
    assert_eq!(
        bh.apply(json!({"block": "image"})).unwrap(),
        r#"<img class="image" src="a.png"/>"#
    );
}

#[test]
fn test_modifier_classes() {
    let bh = Bh::new();
    let html = bh
        .apply(json!({
            "block": "button",
            "mods": {"disabled": true, "size": "s", "hidden": false, "theme": ""},
            "content": {"elem": "text", "elemMods": {"bold": true}}
        }))
        .unwrap();
    insta::assert_snapshot!(html, @r#"<div class="button button_disabled button_size_s"><div class="button__text button__text_bold"></div></div>"#);
}

#[test]
fn test_builder_input() {
    let bh = Bh::new();
    let node = ElementNode::block("link")
        .with_tag("a")
        .with_attr("href", "/")
        .with_content("home");
    assert_eq!(
        bh.apply(node).unwrap(),
        r#"<a class="link" href="/">home</a>"#
    );
}

#[test]
fn test_literal_text_input() {
    let bh = Bh::new();
    let html = bh
        .apply("({ block: 'button', mods: { type: 'link' }, content: [ 'a', , 'b' ] })")
        .unwrap();
    assert_eq!(html, r#"<div class="button button_type_link">ab</div>"#);
}

#[test]
fn test_empty_object_renders_nothing() {
    assert_eq!(Bh::new().apply(json!({})).unwrap(), "");
}

#[test]
fn test_deep_literal_is_a_syntax_error() {
    let input = format!("{}{}", "[".repeat(5000), "]".repeat(5000));
    let err = Bh::new().apply(input).unwrap_err();
    assert!(matches!(err, Error::Syntax(ref e) if e.message.contains("nesting")));
}

#[test]
fn test_plain_text_input_passes_through() {
    assert_eq!(Bh::new().apply("just text").unwrap(), "just text");
}

#[test]
fn test_literal_syntax_error_location() {
    let err = Bh::new().apply("{\n  block: 'b'\n  elem: 'e'\n}").unwrap_err();
    match err {
        Error::Syntax(e) => assert_eq!((e.line, e.column), (3, 3)),
        other => panic!("unexpected error: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Rule ordering and first-writer-wins
// ---------------------------------------------------------------------------

#[test]
fn test_later_rules_run_first() {
    let mut bh = Bh::new();
    bh.register("button", |ctx| {
        ctx.set_tag("button", false);
        Ok(None)
    });
    bh.register("button", |ctx| {
        ctx.set_tag("span", false);
        Ok(None)
    });
    assert_eq!(
        bh.apply(json!({"block": "button"})).unwrap(),
        r#"<span class="button"></span>"#
    );
}

#[test]
fn test_user_attrs_are_not_overridden() {
    let mut bh = Bh::new();
    bh.register("button", |ctx| {
        ctx.set_attrs(
            attrs([("type", AttrValue::from("button")), ("disabled", AttrValue::from(true))]),
            false,
        );
        Ok(None)
    });
    let html = bh
        .apply(json!({
            "block": "button",
            "attrs": {"type": "link", "disabled": null, "name": "button"}
        }))
        .unwrap();
    assert_eq!(html, r#"<div class="button" type="link" name="button"></div>"#);
}

#[test]
fn test_forced_attrs_go_first() {
    let mut bh = Bh::new();
    bh.register("button", |ctx| {
        ctx.set_attrs(
            attrs([("type", AttrValue::from("button")), ("disabled", AttrValue::Null)]),
            true,
        );
        Ok(None)
    });
    let html = bh
        .apply(json!({
            "block": "button",
            "attrs": {"name": "button", "type": "link", "disabled": "disabled"}
        }))
        .unwrap();
    assert_eq!(html, r#"<div class="button" type="button" name="button"></div>"#);
}

#[test]
fn test_attr_from_later_rule_wins_unless_forced() {
    let mut bh = Bh::new();
    bh.register("button", |ctx| {
        ctx.set_attr("type", "control", false).set_attr("tabindex", 0, false);
        Ok(None)
    });
    bh.register("button", |ctx| {
        ctx.set_attr("type", "button", false);
        Ok(None)
    });
    assert_eq!(
        bh.apply(json!({"block": "button"})).unwrap(),
        r#"<div class="button" type="button" tabindex="0"></div>"#
    );
}

#[test]
fn test_rule_applies_once_per_node() {
    let calls = Rc::new(Cell::new(0));
    let mut bh = Bh::new();
    let seen = Rc::clone(&calls);
    bh.register("button", move |ctx| {
        seen.set(seen.get() + 1);
        Ok(Some(Node::list(vec![ctx.snapshot(), ctx.snapshot()])))
    });
    let html = bh.apply(json!({"block": "button"})).unwrap();
    assert_eq!(html, r#"<div class="button"></div><div class="button"></div>"#);
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_falsy_result_renders_empty() {
    let mut bh = Bh::new();
    bh.register("button", |_ctx| Ok(Some(Node::from(false))));
    assert_eq!(bh.apply(json!([{"block": "button"}, "x"])).unwrap(), "x");
}

#[test]
fn test_zero_result_renders_empty() {
    let mut bh = Bh::new();
    bh.register("counter", |_ctx| Ok(Some(Node::from(0))));
    assert_eq!(bh.apply(json!({"block": "counter"})).unwrap(), "");
}

#[test]
fn test_template_error_propagates() {
    let mut bh = Bh::new();
    bh.register("button", |_ctx| Err(Error::template("no label")));
    let err = bh.apply(json!({"block": "button"})).unwrap_err();
    assert!(matches!(err, Error::Template(ref msg) if msg == "no label"));
}

#[test]
fn test_register_map() {
    let tag: Template = Rc::new(|ctx: &mut Context<'_>| {
        ctx.set_tag("span", false);
        Ok(None)
    });
    let cls: Template = Rc::new(|ctx: &mut Context<'_>| {
        ctx.set_cls("extra", false);
        Ok(None)
    });
    let mut bh = Bh::new();
    bh.register_map(vec![(vec!["a", "b"], tag), (vec!["b"], cls)]);
    assert_eq!(
        bh.apply(json!([{"block": "a"}, {"block": "b"}])).unwrap(),
        r#"<span class="a"></span><span class="b extra"></span>"#
    );
}

// ---------------------------------------------------------------------------
// Selectors
// ---------------------------------------------------------------------------

#[test]
fn test_mod_selectors() {
    let mut bh = Bh::new();
    bh.register("button_disabled", |ctx| {
        ctx.set_attr("disabled", true, false);
        Ok(None)
    });
    bh.register("button__text_size_s", |ctx| {
        ctx.set_tag("small", false);
        Ok(None)
    });
    let html = bh
        .apply(json!([
            {"block": "button", "mods": {"disabled": true}, "content": {"elem": "text", "elemMods": {"size": "s"}}},
            {"block": "button", "mods": {"disabled": "yes"}, "content": {"elem": "text", "elemMods": {"size": "m"}}}
        ]))
        .unwrap();
    insta::assert_snapshot!(html, @r#"<div class="button button_disabled" disabled><small class="button__text button__text_size_s"></small></div><div class="button button_disabled_yes"><div class="button__text button__text_size_m"></div></div>"#);
}

#[test]
fn test_flag_selector_needs_true() {
    let mut bh = Bh::new();
    bh.register("input__control_valid", |ctx| {
        ctx.set_tag("input", false);
        Ok(None)
    });
    let html = bh
        .apply(json!({"block": "input", "content": [
            {"elem": "control", "elemMods": {"valid": true}},
            {"elem": "control", "elemMods": {"valid": "valid"}}
        ]}))
        .unwrap();
    assert_eq!(
        html,
        r#"<div class="input"><input class="input__control input__control_valid"/><div class="input__control input__control_valid_valid"></div></div>"#
    );
}

#[test]
fn test_custom_naming() {
    let naming = Naming::new().with_elem("--").with_mod("_").with_val("_");
    let mut bh = bh_with(Options::new().with_naming(naming));
    bh.register("card--title_big", |ctx| {
        ctx.set_tag("h2", false);
        Ok(None)
    });
    let html = bh
        .apply(json!({"block": "card", "content": {"elem": "title", "elemMods": {"big": true}}}))
        .unwrap();
    assert_eq!(
        html,
        r#"<div class="card"><h2 class="card--title card--title_big"></h2></div>"#
    );
}

// ---------------------------------------------------------------------------
// Hooks
// ---------------------------------------------------------------------------

#[test]
fn test_hooks_run_on_blockless_nodes() {
    let mut bh = Bh::new();
    bh.before_each(|ctx| {
        ctx.set_tag("b", false).set_bem(false, false);
        Ok(None)
    });
    let html = bh
        .apply(json!([{"content": "foo"}, {"block": "button"}, {"block": "input", "elem": "control"}]))
        .unwrap();
    assert_eq!(html, "<b>foo</b><b></b><b></b>");
}

#[test]
fn test_before_each_runs_before_rules() {
    let mut bh = Bh::new();
    bh.register("button", |ctx| {
        ctx.set_tag("button", false);
        Ok(None)
    });
    bh.before_each(|ctx| {
        ctx.set_tag("span", false);
        Ok(None)
    });
    bh.register("button", |ctx| {
        ctx.set_tag("strong", false);
        Ok(None)
    });
    assert_eq!(
        bh.apply(json!({"block": "button"})).unwrap(),
        r#"<span class="button"></span>"#
    );
}

#[test]
fn test_after_each_runs_after_rules() {
    let mut bh = Bh::new();
    bh.register("button", |ctx| {
        ctx.set_tag("button", true);
        Ok(None)
    });
    bh.after_each(|ctx| {
        ctx.set_tag("span", true);
        Ok(None)
    });
    bh.register("button", |ctx| {
        ctx.set_tag("strong", true);
        Ok(None)
    });
    assert_eq!(
        bh.apply(json!({"block": "button"})).unwrap(),
        r#"<span class="button"></span>"#
    );
}

#[test]
fn test_hooks_run_latest_first() {
    let mut bh = Bh::new();
    for suffix in ['2', '1'] {
        bh.before_each(move |ctx| {
            if let Some(el) = ctx.element_mut() {
                el.cls.get_or_insert_with(String::new).push(suffix);
            }
            Ok(None)
        });
    }
    assert_eq!(
        bh.apply(json!({"block": "button", "cls": "foo"})).unwrap(),
        r#"<div class="button foo12"></div>"#
    );
}

#[test]
fn test_hook_results_are_ignored() {
    let mut bh = Bh::new();
    bh.after_each(|_ctx| Ok(Some(Node::text("replaced"))));
    assert_eq!(
        bh.apply(json!({"block": "button"})).unwrap(),
        r#"<div class="button"></div>"#
    );
}

// ---------------------------------------------------------------------------
// stop and applyBase
// ---------------------------------------------------------------------------

#[test]
fn test_stop_prevents_earlier_rules() {
    let mut bh = Bh::new();
    bh.register("button", |ctx| {
        ctx.set_tag("button", true);
        Ok(None)
    });
    bh.register("button", |ctx| {
        ctx.set_tag("span", false).stop();
        Ok(None)
    });
    assert_eq!(
        bh.apply(json!({"block": "button"})).unwrap(),
        r#"<span class="button"></span>"#
    );
}

#[test]
fn test_stop_and_after_hooks() {
    let build = |options: Options| {
        let mut bh = bh_with(options);
        bh.register("button", |ctx| {
            ctx.stop();
            Ok(None)
        });
        bh.after_each(|ctx| {
            ctx.set_attr("data-after", "1", false);
            Ok(None)
        });
        bh.apply(json!({"block": "button"})).unwrap()
    };
    assert_eq!(
        build(Options::new()),
        r#"<div class="button" data-after="1"></div>"#
    );
    assert_eq!(
        build(Options::new().with_stop_skips_after_hooks(true)),
        r#"<div class="button"></div>"#
    );
}

#[test]
fn test_apply_base_sees_new_mod() {
    let mut bh = Bh::new();
    bh.register("button", |ctx| {
        ctx.set_mod("type", "span", false).apply_base()?;
        Ok(None)
    });
    bh.register("button_type_span", |ctx| {
        ctx.set_tag("span", false);
        Ok(None)
    });
    assert_eq!(
        bh.apply(json!({"block": "button"})).unwrap(),
        r#"<span class="button button_type_span"></span>"#
    );
}

#[test]
fn test_apply_base_wraps_content() {
    let mut bh = Bh::new();
    bh.register("button", |ctx| {
        let inner = ctx.take_content();
        ctx.set_content(
            Node::list(vec![
                ElementNode::elem("base-before").into(),
                inner,
                ElementNode::elem("base-after").into(),
            ]),
            true,
        );
        Ok(None)
    });
    bh.register("button", |ctx| {
        ctx.apply_base()?;
        let inner = ctx.take_content();
        ctx.set_content(
            Node::list(vec![
                ElementNode::elem("before").into(),
                inner,
                ElementNode::elem("after").into(),
            ]),
            true,
        );
        Ok(None)
    });
    let html = bh.apply(json!({"block": "button", "content": "Hello"})).unwrap();
    insta::assert_snapshot!(html, @r#"<div class="button"><div class="button__before"></div><div class="button__base-before"></div>Hello<div class="button__base-after"></div><div class="button__after"></div></div>"#);
}

#[test]
fn test_apply_base_while_wrapping() {
    let mut bh = Bh::new();
    bh.register("button", |ctx| {
        Ok(Some(Node::list(vec![
            ElementNode::elem("base-before").into(),
            ctx.snapshot(),
            ElementNode::elem("base-after").into(),
        ])))
    });
    bh.register("button", |ctx| {
        ctx.apply_base()?;
        Ok(Some(Node::list(vec![
            ElementNode::elem("before").into(),
            ctx.snapshot(),
            ElementNode::elem("after").into(),
        ])))
    });
    let html = bh.apply(json!({"block": "button", "content": "Hello"})).unwrap();
    insta::assert_snapshot!(html, @r#"<div class="button__before"></div><div class="button__base-before"></div><div class="button">Hello</div><div class="button__base-after"></div><div class="button__after"></div>"#);
}

#[test]
fn test_apply_base_keeps_tparams() {
    let sum = Rc::new(Cell::new(0));
    let mut bh = Bh::new();
    bh.register("select__control", |ctx| {
        ctx.set_tparam("lol", 33, false);
        Ok(None)
    });
    bh.register("select", |ctx| {
        ctx.set_tparam("foo", 22, false);
        Ok(None)
    });
    bh.register("select_disabled", |ctx| {
        ctx.apply_base()?.set_tparam("bar", 11, false);
        Ok(None)
    });
    let out = Rc::clone(&sum);
    bh.register("select__control", move |ctx| {
        ctx.apply_base()?;
        let total: i64 = ["foo", "bar", "lol"]
            .iter()
            .filter_map(|key| ctx.tparam(key).and_then(Node::as_i64))
            .sum();
        out.set(total);
        Ok(None)
    });
    bh.apply(json!({"block": "select", "mods": {"disabled": true}, "content": {"elem": "control"}}))
        .unwrap();
    assert_eq!(sum.get(), 66);
}

#[test]
fn test_apply_base_keeps_position() {
    let mut bh = Bh::new();
    bh.register("button", |ctx| {
        mark_edges(ctx);
        Ok(None)
    });
    bh.register("button", |ctx| {
        ctx.apply_base()?;
        Ok(None)
    });
    let html = bh
        .apply(json!([{"block": "button"}, {"block": "button"}, {"block": "button"}]))
        .unwrap();
    assert_eq!(
        html,
        r#"<div class="button button_first_yes"></div><div class="button"></div><div class="button button_last_yes"></div>"#
    );
}

#[test]
fn test_apply_base_from_hooks_runs_rules_only() {
    let calls = Rc::new(Cell::new(0));
    let mut bh = bh_with(Options::new().with_infinite_loop_detection(true));
    let seen = Rc::clone(&calls);
    bh.register("b", move |ctx| {
        seen.set(seen.get() + 1);
        ctx.set_tag("span", false);
        Ok(None)
    });
    bh.before_each(|ctx| {
        ctx.apply_base()?;
        Ok(None)
    });
    bh.after_each(|ctx| {
        ctx.apply_base()?.set_attr("data-done", true, false);
        Ok(None)
    });
    assert_eq!(
        bh.apply(json!({"block": "b"})).unwrap(),
        r#"<span class="b" data-done></span>"#
    );
    assert_eq!(calls.get(), 1);
}

// ---------------------------------------------------------------------------
// Position and tree params
// ---------------------------------------------------------------------------

#[test]
fn test_first_and_last_through_nested_lists() {
    let mut bh = Bh::new();
    bh.register("button__inner", |ctx| {
        mark_edges(ctx);
        Ok(None)
    });
    let html = bh
        .apply(json!({
            "block": "button",
            "content": [[{"elem": "inner"}], [{"elem": "inner"}, [{"elem": "inner"}]]]
        }))
        .unwrap();
    insta::assert_snapshot!(html, @r#"<div class="button"><div class="button__inner button__inner_first_yes"></div><div class="button__inner"></div><div class="button__inner button__inner_last_yes"></div></div>"#);
}

#[test]
fn test_single_content_is_first_and_last() {
    let mut bh = Bh::new();
    bh.register("button__inner", |ctx| {
        let pos = ctx.position();
        mark_edges(ctx);
        ctx.set_mod("pos", pos, false);
        Ok(None)
    });
    assert_eq!(
        bh.apply(json!({"block": "button", "content": {"elem": "inner"}})).unwrap(),
        r#"<div class="button"><div class="button__inner button__inner_first_yes button__inner_last_yes button__inner_pos_1"></div></div>"#
    );
}

#[test]
fn test_position_skips_non_elements() {
    let mut bh = Bh::new();
    bh.register("button", |ctx| {
        mark_edges(ctx);
        Ok(None)
    });
    let html = bh
        .apply(json!([
            false,
            {"block": "button"},
            {"content": [false, {"block": "button"}, {"block": "button"}, {"block": "button"}, [null]]},
            null
        ]))
        .unwrap();
    insta::assert_snapshot!(html, @r#"<div class="button button_first_yes"></div><div><div class="button button_first_yes"></div><div class="button"></div><div class="button button_last_yes"></div></div>"#);
}

#[test]
fn test_root_has_no_position() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut bh = Bh::new();
    let log = Rc::clone(&seen);
    bh.register("page", move |ctx| {
        log.borrow_mut().push((ctx.position(), ctx.is_first(), ctx.is_last()));
        Ok(None)
    });
    bh.apply(json!({"block": "page"})).unwrap();
    assert_eq!(*seen.borrow(), vec![(None, false, false)]);
}

#[test]
fn test_tparam_visible_to_descendants_only() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut bh = Bh::new();
    bh.register("button", |ctx| {
        ctx.set_tparam("name", "sample", false);
        Ok(None)
    });
    let log = Rc::clone(&seen);
    bh.register("input", move |ctx| {
        log.borrow_mut()
            .push(ctx.tparam("name").and_then(Node::as_str).map(str::to_owned));
        Ok(None)
    });
    bh.apply(json!([
        {"block": "button", "content": {"elem": "inner", "content": {"block": "input"}}},
        {"block": "input"}
    ]))
    .unwrap();
    // The top-level input is visited before the nested one.
    assert_eq!(*seen.borrow(), vec![None, Some("sample".to_owned())]);
}

#[test]
fn test_forced_tparam_overrides() {
    let seen = Rc::new(Cell::new(0));
    let mut bh = Bh::new();
    bh.register("button", |ctx| {
        ctx.set_tparam("foo", 1, true);
        Ok(None)
    });
    bh.register("button", |ctx| {
        ctx.set_tparam("foo", 2, false);
        Ok(None)
    });
    let out = Rc::clone(&seen);
    bh.register("button__control", move |ctx| {
        out.set(ctx.tparam("foo").and_then(Node::as_i64).unwrap_or_default());
        Ok(None)
    });
    bh.apply(json!({"block": "button", "content": {"elem": "control"}})).unwrap();
    assert_eq!(seen.get(), 1);
}

// ---------------------------------------------------------------------------
// Structure: wrapping, process, inheritance
// ---------------------------------------------------------------------------

#[test]
fn test_wrapping_siblings_inherit_block() {
    let mut bh = Bh::new();
    bh.register("button", |ctx| {
        Ok(Some(Node::list(vec![
            ElementNode::elem("before").into(),
            ctx.snapshot(),
            ElementNode::elem("after").into(),
        ])))
    });
    assert_eq!(
        bh.apply(json!({"block": "button"})).unwrap(),
        r#"<div class="button__before"></div><div class="button"></div><div class="button__after"></div>"#
    );
}

#[test]
fn test_process_nested_block() {
    let mut bh = Bh::new();
    bh.register("search", |ctx| {
        let input = ctx.process(json!({"block": "input"}))?;
        ctx.set_content(input, false);
        Ok(None)
    });
    bh.register("input", |ctx| {
        ctx.set_tag("input", false);
        Ok(None)
    });
    assert_eq!(
        bh.apply(json!({"block": "search"})).unwrap(),
        r#"<div class="search"><input class="input"/></div>"#
    );
}

#[test]
fn test_process_element_inherits_block() {
    let mut bh = Bh::new();
    bh.register("button", |ctx| {
        let inner = ctx.process(json!({"elem": "inner"}))?;
        ctx.set_content(inner, false);
        Ok(None)
    });
    bh.register("button__inner", |ctx| {
        ctx.set_tag("span", false);
        Ok(None)
    });
    assert_eq!(
        bh.apply(json!({"block": "button"})).unwrap(),
        r#"<div class="button"><span class="button__inner"></span></div>"#
    );
}

#[test]
fn test_element_mods_and_inherited_block_mods() {
    let seen = Rc::new(RefCell::new(None));
    let mut bh = Bh::new();
    let out = Rc::clone(&seen);
    bh.register("button__text", move |ctx| {
        let el = ctx.element().map(|el| (el.mods.clone(), el.elem_mods.clone()));
        *out.borrow_mut() = el;
        Ok(None)
    });
    bh.apply(json!({
        "block": "button",
        "mods": {"theme": "dark"},
        "content": {"elem": "text", "mods": {"size": "s"}}
    }))
    .unwrap();
    assert_eq!(
        *seen.borrow(),
        Some((
            Some(Mods::new().with("theme", "dark")),
            Some(Mods::new().with("size", "s"))
        ))
    );
}

// ---------------------------------------------------------------------------
// Mixes and JS
// ---------------------------------------------------------------------------

#[test]
fn test_mix_appends_unless_forced() {
    let mut bh = Bh::new();
    bh.register("button", |ctx| {
        ctx.set_mix(json!({"block": "mix2"}), false);
        Ok(None)
    });
    bh.register("link", |ctx| {
        ctx.set_mix(json!([{"block": "mix"}]), true);
        Ok(None)
    });
    let html = bh
        .apply(json!([
            {"block": "button", "mix": {"block": "mix1"}},
            {"block": "link", "mix": [{"block": "user-mix"}]}
        ]))
        .unwrap();
    assert_eq!(
        html,
        r#"<div class="button mix1 mix2"></div><div class="link mix"></div>"#
    );
}

#[test]
fn test_mix_inherits_names() {
    let mut bh = Bh::new();
    bh.register(["button", "button__control"], |ctx| {
        ctx.set_mix(
            json!([
                {"mods": {"disabled": true}},
                {"elem": "input", "mods": {"active": true}},
                {"block": "clearfix"}
            ]),
            false,
        );
        Ok(None)
    });
    let html = bh
        .apply(json!([{"block": "button"}, {"block": "button", "elem": "control"}]))
        .unwrap();
    insta::assert_snapshot!(html, @r#"<div class="button button_disabled button__input button__input_active clearfix"></div><div class="button__control button__control_disabled button__input button__input_active clearfix"></div>"#);
}

#[test]
fn test_js_params_merge() {
    let mut bh = Bh::new();
    bh.register("button", |ctx| {
        ctx.set_js(json!({"a": 1, "b": 2}), false);
        Ok(None)
    });
    bh.register("button", |ctx| {
        ctx.set_js(json!({"a": 0}), false);
        Ok(None)
    });
    assert_eq!(
        bh.apply(json!({"block": "button"})).unwrap(),
        r#"<div class="button i-bem" onclick="return {&quot;button&quot;:{&quot;a&quot;:0,&quot;b&quot;:2}}"></div>"#
    );
}

#[test]
fn test_bem_false_drops_classes_and_js() {
    let bh = Bh::new();
    assert_eq!(
        bh.apply(json!({"block": "button", "bem": false, "js": true, "cls": "raw"}))
            .unwrap(),
        r#"<div class="raw"></div>"#
    );
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[test]
fn test_default_js_attr() {
    assert_eq!(
        Bh::new().apply(json!({"block": "button", "js": true})).unwrap(),
        r#"<div class="button i-bem" onclick="return {&quot;button&quot;:{}}"></div>"#
    );
}

#[test]
fn test_js_attr_name_and_scheme() {
    let js = json!({"block": "button", "js": true});
    let dbl = bh_with(Options::new().with_js_attr_name("ondblclick"));
    assert_eq!(
        dbl.apply(js.clone()).unwrap(),
        r#"<div class="button i-bem" ondblclick="return {&quot;button&quot;:{}}"></div>"#
    );

    let data = bh_with(
        Options::new()
            .with_js_attr_name("data-bem")
            .with_js_attr_scheme(JsAttrScheme::Json),
    );
    assert_eq!(
        data.apply(js).unwrap(),
        r#"<div class="button i-bem" data-bem="{&quot;button&quot;:{}}"></div>"#
    );
}

#[test]
fn test_js_cls_option() {
    let js = json!({"block": "button", "js": true});
    assert_eq!(
        bh_with(Options::new().with_js_cls(Some("js"))).apply(js.clone()).unwrap(),
        r#"<div class="button js" onclick="return {&quot;button&quot;:{}}"></div>"#
    );
    assert_eq!(
        bh_with(Options::new().with_js_cls(None)).apply(js).unwrap(),
        r#"<div class="button" onclick="return {&quot;button&quot;:{}}"></div>"#
    );
}

#[test]
fn test_no_base_mods_option() {
    let bh = bh_with(Options::new().with_no_base_mods(true));
    let html = bh
        .apply(json!({
            "block": "button",
            "mods": {"disabled": true, "theme": "new"},
            "mix": [{"block": "clearfix"}, {"elem": "box", "elemMods": {"pick": "left"}}],
            "content": {"elem": "control", "elemMods": {"disabled": true}}
        }))
        .unwrap();
    insta::assert_snapshot!(html, @r#"<div class="button _disabled _theme_new clearfix button__box _pick_left"><div class="button__control _disabled"></div></div>"#);
}

#[test]
fn test_escape_content_option() {
    let input = json!({"block": "code", "content": "<b>&</b>"});
    assert_eq!(
        Bh::new().apply(input.clone()).unwrap(),
        r#"<div class="code"><b>&</b></div>"#
    );
    assert_eq!(
        bh_with(Options::new().with_escape_content(true)).apply(input).unwrap(),
        r#"<div class="code">&lt;b&gt;&amp;&lt;/b&gt;</div>"#
    );
}

#[test]
fn test_invalid_options_rejected() {
    let err = Bh::with_options(Options::new().with_js_attr_name("")).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}

// ---------------------------------------------------------------------------
// Loop detection
// ---------------------------------------------------------------------------

#[test]
fn test_node_loop_detected() {
    let mut bh = bh_with(Options::new().with_infinite_loop_detection(true));
    bh.before_each(|ctx| {
        let copy = ctx.snapshot();
        ctx.set_content(copy, true);
        Ok(None)
    });
    let err = bh.apply(json!({"block": "button"})).unwrap_err();
    assert!(matches!(err, Error::LoopDetected { scope: LoopScope::Node, .. }));
    assert!(err.to_string().starts_with("infinite json loop detected"));
}

#[test]
fn test_matcher_loop_detected() {
    let mut bh = bh_with(Options::new().with_infinite_loop_detection(true));
    bh.register("input", |ctx| {
        ctx.set_content(json!({"block": "button"}), false);
        Ok(None)
    });
    bh.register("button", |ctx| {
        ctx.set_content(json!({"block": "input"}), false);
        Ok(None)
    });
    let err = bh.apply(json!({"block": "button"})).unwrap_err();
    assert!(err.is_loop());
    assert!(matches!(err, Error::LoopDetected { scope: LoopScope::Matcher, .. }));
}

#[test]
fn test_loop_counter_resets_between_runs() {
    let mut bh = bh_with(Options::new().with_infinite_loop_detection(true));
    bh.register("item", |_ctx| Ok(None));
    let many: Vec<_> = (0..600).map(|_| json!({"block": "item"})).collect();
    assert!(bh.apply(json!(many.clone())).is_ok());
    assert!(bh.apply(json!(many)).is_ok());
}

// ---------------------------------------------------------------------------
// Context helpers
// ---------------------------------------------------------------------------

#[test]
fn test_generated_ids_are_unique() {
    let ids = Rc::new(RefCell::new(Vec::new()));
    let mut bh = Bh::new();
    let out = Rc::clone(&ids);
    bh.register("button", move |ctx| {
        let (a, b) = (ctx.generate_id(), ctx.generate_id());
        out.borrow_mut().extend([a, b]);
        Ok(None)
    });
    bh.apply(json!({"block": "button"})).unwrap();
    bh.apply(json!({"block": "button"})).unwrap();

    let ids = ids.borrow();
    assert_eq!(ids.len(), 4);
    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 4);
    assert!(ids.iter().all(|id| id.starts_with("uniq")));
}

#[test]
fn test_is_simple() {
    assert!(Context::is_simple(&Node::text("a")));
    assert!(Context::is_simple(&Node::from(1)));
    assert!(Context::is_simple(&Node::Absent));
    assert!(!Context::is_simple(&Node::from(ElementNode::block("b"))));
    assert!(!Context::is_simple(&Node::list(vec![Node::text("a")])));
}

#[test]
fn test_html_wins_over_content() {
    let mut bh = Bh::new();
    bh.register("raw", |ctx| {
        ctx.set_html("<i>x</i>", false).set_content("ignored", false);
        Ok(None)
    });
    assert_eq!(
        bh.apply(json!({"block": "raw"})).unwrap(),
        r#"<div class="raw"><i>x</i></div>"#
    );
}
