use proc_macro2::{Delimiter, Group, Span, TokenStream};
use quote::{ToTokens, TokenStreamExt, quote};
use std::fmt;
use std::rc::Rc;
use syn::{
    Ident, LitChar, LitInt, LitStr, Path, Token, braced, bracketed,
    parse::{Parse, ParseStream, Parser},
    punctuated::Punctuated,
    spanned::Spanned,
};

mod keymap;

/// Prefix of keys that are sent along with shift, like `s:Nuhs`.
const SHIFTED_PREFIX: &str = "s";

/// Prefix of the aliases only a board's own resolver knows about.
const USER_PREFIX: &str = "u";

/// Prefixes forwarded as-is to the alias resolver macro.
const ALIAS_PREFIXES: &[&str] = &["c", "m", "f", USER_PREFIX];

struct ResultAcc<T, E> {
    oks: Vec<T>,
    errors: Vec<E>,
}

impl<A, E> FromIterator<Result<A, E>> for ResultAcc<A, E> {
    fn from_iter<T: IntoIterator<Item = Result<A, E>>>(iter: T) -> Self {
        let iter = iter.into_iter();

        let mut oks = Vec::with_capacity(iter.size_hint().0);
        let mut errors = Vec::new();

        for e in iter {
            match e {
                Ok(v) => oks.push(v),
                Err(e) => errors.push(e),
            }
        }

        ResultAcc { oks, errors }
    }
}

impl<T> ResultAcc<T, syn::Error> {
    fn into_syn_result(self) -> syn::Result<Vec<T>> {
        match combine_syn_errors(&self.errors) {
            Some(e) => Err(e),
            None => Ok(self.oks),
        }
    }
}

fn combine_syn_errors(errors: &[syn::Error]) -> Option<syn::Error> {
    let mut head = errors.first().cloned()?;
    for e in &errors[1..] {
        head.combine(e.clone());
    }

    Some(head)
}

pub(crate) fn thkb_core_symbol(module: &str, name: &str) -> TokenStream {
    let module = Ident::new(module, Span::call_site());
    let name = Ident::new(name, Span::call_site());
    quote! {
        ::thkb_core::#module::#name
    }
}

#[derive(Debug, Clone, PartialEq, PartialOrd, Ord, Eq, Hash)]
pub(crate) enum KeyRef {
    Ident(String),
    LitInt(u32),
    LitChr(char),
}

impl KeyRef {
    pub fn ident(str: &str) -> KeyRef {
        Self::Ident(str.to_string())
    }

    pub fn litnum(n: u32) -> KeyRef {
        Self::LitInt(n)
    }

    pub fn litchr(ch: char) -> KeyRef {
        Self::LitChr(ch)
    }

    fn is_literal(&self) -> bool {
        !matches!(self, KeyRef::Ident(_))
    }

    /// Parses a single key: an identifier, a number, or a character given
    /// either as a char or as a one character string.
    fn parse_key(input: ParseStream) -> syn::Result<(KeyRef, Span)> {
        let (key_ref, span) = if input.peek(LitInt) {
            let lit = input.parse::<LitInt>()?;
            (KeyRef::LitInt(lit.base10_parse()?), lit.span())
        } else if input.peek(LitChar) {
            let lit = input.parse::<LitChar>()?;
            (KeyRef::LitChr(lit.value()), lit.span())
        } else if input.peek(LitStr) {
            let lit = input.parse::<LitStr>()?;
            let value = lit.value();
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => (KeyRef::LitChr(c), lit.span()),
                _ => {
                    return Err(syn::Error::new(
                        lit.span(),
                        "String keys must contain exactly one character",
                    ));
                }
            }
        } else {
            let ident = input.parse::<Ident>()?;
            (KeyRef::Ident(ident.to_string()), ident.span())
        };

        if key_ref.is_literal() && !keymap::is_known_key_ref(&key_ref) {
            return Err(syn::Error::new(
                span,
                format!("Unknown key: {}", key_ref),
            ));
        }

        Ok((key_ref, span))
    }
}

impl fmt::Display for KeyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyRef::Ident(ident) => write!(f, "{}", ident),
            KeyRef::LitInt(int) => write!(f, "{}", int),
            KeyRef::LitChr(c) => write!(f, "{}", c),
        }
    }
}

#[derive(Debug, Clone)]
enum KeyAction {
    Passthrough(Span),
    NoOp(Span),
    StandardKey(KeyRef, Span),
    ShiftedKey(KeyRef, Span),
    Alias { prefix: Ident, name: Ident },
}

/// A [`KeyAction`] that has been computed, taking into account any
/// parent layer, which removes the "Passthrough" key action.
#[derive(Debug, Clone)]
enum ConcreteKeyAction {
    NoOp,
    Transparent,
    StandardKey(KeyRef),
    ShiftedKey(KeyRef),
    Alias {
        resolver: TokenStream,
        prefix: Ident,
        name: Ident,
    },
}

impl Parse for KeyAction {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if let Ok(t) = input.parse::<Token![*]>() {
            return Ok(KeyAction::Passthrough(t.span()));
        }
        if let Ok(t) = input.parse::<Token![_]>() {
            return Ok(KeyAction::NoOp(t.span()));
        }

        if !(input.peek(Ident) && input.peek2(Token![:])) {
            let (key_ref, span) = KeyRef::parse_key(input)?;
            return Ok(KeyAction::StandardKey(key_ref, span));
        }

        let prefix = input.parse::<Ident>()?;
        input.parse::<Token![:]>()?;

        match prefix.to_string().as_str() {
            SHIFTED_PREFIX => {
                let (key_ref, span) = KeyRef::parse_key(input)?;
                Ok(KeyAction::ShiftedKey(key_ref, span))
            }
            p if ALIAS_PREFIXES.contains(&p) => Ok(KeyAction::Alias {
                prefix,
                name: input.parse::<Ident>()?,
            }),
            p => Err(syn::Error::new(
                prefix.span(),
                format!(
                    "Unknown key prefix '{}'. Expected one of: {}, {}",
                    p,
                    SHIFTED_PREFIX,
                    ALIAS_PREFIXES.join(", ")
                ),
            )),
        }
    }
}

impl KeyAction {
    fn span(&self) -> Span {
        match self {
            KeyAction::Passthrough(span)
            | KeyAction::NoOp(span)
            | KeyAction::StandardKey(_, span)
            | KeyAction::ShiftedKey(_, span) => *span,
            KeyAction::Alias { prefix, .. } => prefix.span(),
        }
    }

    /// The final action of this key, unless it has to be taken from a parent
    /// layer.
    fn concretize(&self, alias_resolver: &TokenStream) -> Option<ConcreteKeyAction> {
        match self {
            KeyAction::Passthrough(_) => None,
            KeyAction::NoOp(_) => Some(ConcreteKeyAction::NoOp),
            KeyAction::StandardKey(key_ref, _) => {
                Some(ConcreteKeyAction::StandardKey(key_ref.clone()))
            }
            KeyAction::ShiftedKey(key_ref, _) => {
                Some(ConcreteKeyAction::ShiftedKey(key_ref.clone()))
            }
            KeyAction::Alias { prefix, name } => Some(ConcreteKeyAction::Alias {
                resolver: alias_resolver.clone(),
                prefix: prefix.clone(),
                name: name.clone(),
            }),
        }
    }
}

#[derive(Debug)]
enum AttrValue {
    Str(LitStr),
    Int(LitInt),
    BracketGroup(Group),
}

impl AttrValue {
    fn span(&self) -> Span {
        match self {
            AttrValue::Str(v) => v.span(),
            AttrValue::Int(v) => v.span(),
            AttrValue::BracketGroup(v) => v.span(),
        }
    }
}

impl Parse for AttrValue {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if let Ok(str) = input.parse::<LitStr>() {
            return Ok(AttrValue::Str(str));
        }
        if let Ok(int) = input.parse::<LitInt>() {
            return Ok(AttrValue::Int(int));
        }
        if let Ok(g) = input.parse::<Group>() {
            if g.delimiter() == Delimiter::Bracket {
                return Ok(AttrValue::BracketGroup(g));
            }
        }

        Err(syn::Error::new(
            input.span(),
            "Unrecognized attribute value type",
        ))
    }
}

#[derive(Debug)]
struct Attr {
    key: Ident,
    value: AttrValue,
}

impl Attr {
    fn key_name(&self) -> String {
        self.key.to_string()
    }

    fn require_value_str(&self) -> syn::Result<LitStr> {
        match &self.value {
            AttrValue::Str(lit_str) => Ok(lit_str.clone()),
            _ => Err(syn::Error::new(
                self.value.span(),
                format!("Expected string value for attribute {}", self.key_name()),
            )),
        }
    }

    fn require_value_bracket_group(&self) -> syn::Result<Group> {
        match &self.value {
            AttrValue::BracketGroup(group) => Ok(group.clone()),
            _ => Err(syn::Error::new(
                self.value.span(),
                format!(
                    "Expected square brackets value for attribute {}",
                    self.key_name()
                ),
            )),
        }
    }
}

impl Parse for Attr {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let key = input.parse::<Ident>()?;
        input.parse::<Token![:]>()?;
        let value = input.parse::<AttrValue>()?;
        Ok(Attr { key, value })
    }
}

struct AttrSetDef {
    attrs: Punctuated<Attr, Token![,]>,
}

impl Parse for AttrSetDef {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        Ok(AttrSetDef {
            attrs: input.parse_terminated(Attr::parse, Token![,])?,
        })
    }
}

#[derive(Debug, Clone)]
struct LayerRow<K> {
    span: Span,
    actions: Vec<K>,
}

impl Parse for LayerRow<KeyAction> {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let content;
        let bracket = bracketed!(content in input);
        let actions = content
            .parse_terminated(KeyAction::parse, Token![,])?
            .into_iter()
            .collect::<Vec<_>>();

        Ok(LayerRow {
            span: bracket.span.join(),
            actions,
        })
    }
}

#[derive(Debug, Clone)]
struct LayerDef<K> {
    rows_span: Span,
    name: LitStr,
    parent: Option<LitStr>,
    rows: Vec<LayerRow<K>>,
}

#[derive(Debug, Clone)]
struct ResolvedLayerDef<K> {
    name: String,
    parent: Option<Rc<ResolvedLayerDef<K>>>,
    rows: Vec<LayerRow<K>>,
}

impl LayerDef<KeyAction> {
    fn parse_rows_from_group(group: Group) -> syn::Result<Vec<LayerRow<KeyAction>>> {
        fn do_parse_rows(input: ParseStream) -> syn::Result<Vec<LayerRow<KeyAction>>> {
            Ok(input
                .parse_terminated(LayerRow::parse, Token![,])?
                .into_iter()
                .collect::<Vec<_>>())
        }

        Parser::parse2(do_parse_rows, group.stream())
    }
}

fn ensure_unset<A: Spanned>(key: &Ident, attr_value_holder: &Option<A>) -> syn::Result<()> {
    if let Some(lit) = attr_value_holder {
        let mut e = syn::Error::new(key.span(), "Attribute value already set previously.");
        e.combine(syn::Error::new(lit.span(), "Previously set here"));
        return Err(e);
    }

    Ok(())
}

fn require_attr<A>(span: Span, attr: &str, holder: Option<A>) -> syn::Result<A> {
    holder.ok_or_else(|| {
        syn::Error::new(
            span,
            format!("Required attribute not found in layer definition: {}", attr),
        )
    })
}

impl Parse for LayerDef<KeyAction> {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        const ATTR_NAME: &str = "name";
        const ATTR_PARENT: &str = "parent";
        const ATTR_ROWS: &str = "rows";

        let content;
        braced!(content in input);
        let attrs = content.parse::<AttrSetDef>()?.attrs;

        let mut name_attr: Option<LitStr> = None;
        let mut parent_attr: Option<LitStr> = None;
        let mut rows_attr: Option<Group> = None;

        for attr in attrs.into_iter() {
            match attr.key_name().as_str() {
                ATTR_NAME => {
                    ensure_unset(&attr.key, &name_attr)?;
                    name_attr.replace(attr.require_value_str()?);
                }
                ATTR_PARENT => {
                    ensure_unset(&attr.key, &parent_attr)?;
                    parent_attr.replace(attr.require_value_str()?);
                }
                ATTR_ROWS => {
                    ensure_unset(&attr.key, &rows_attr)?;
                    rows_attr.replace(attr.require_value_bracket_group()?);
                }
                value => {
                    return Err(syn::Error::new(
                        attr.key.span(),
                        format!("Unknown attribute in layer definition: {}", value),
                    ));
                }
            }
        }

        let rows = require_attr(content.span(), ATTR_ROWS, rows_attr)?;

        Ok(LayerDef {
            rows_span: rows.span(),
            name: require_attr(content.span(), ATTR_NAME, name_attr)?,
            parent: parent_attr,
            rows: Self::parse_rows_from_group(rows)?,
        })
    }
}

#[derive(Debug)]
struct LayersDef<K> {
    alias_resolver: Option<Path>,
    layers: Vec<LayerDef<K>>,
}

#[derive(Debug)]
struct ResolvedLayersDef<K> {
    alias_resolver: TokenStream,
    layers: Vec<Rc<ResolvedLayerDef<K>>>,
}

fn parse_layer_list(input: ParseStream) -> syn::Result<Vec<LayerDef<KeyAction>>> {
    Ok(input
        .parse_terminated(LayerDef::parse, Token![,])?
        .into_iter()
        .collect::<Vec<_>>())
}

impl Parse for LayersDef<KeyAction> {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        const ATTR_ALIAS_RESOLVER: &str = "alias_resolver";
        const ATTR_LAYERS: &str = "layers";

        // Just a list of layers, with no other settings.
        if input.peek(syn::token::Brace) {
            return Ok(LayersDef {
                alias_resolver: None,
                layers: parse_layer_list(input)?,
            });
        }

        let mut alias_resolver: Option<Path> = None;
        let mut layers: Option<(Span, Vec<LayerDef<KeyAction>>)> = None;

        while !input.is_empty() {
            let key = input.parse::<Ident>()?;
            input.parse::<Token![:]>()?;

            match key.to_string().as_str() {
                ATTR_ALIAS_RESOLVER => {
                    ensure_unset(&key, &alias_resolver)?;
                    alias_resolver = Some(input.parse::<Path>()?);
                }
                ATTR_LAYERS => {
                    if let Some((span, _)) = &layers {
                        let mut e =
                            syn::Error::new(key.span(), "Attribute value already set previously.");
                        e.combine(syn::Error::new(*span, "Previously set here"));
                        return Err(e);
                    }
                    let content;
                    bracketed!(content in input);
                    layers = Some((key.span(), parse_layer_list(&content)?));
                }
                value => {
                    return Err(syn::Error::new(
                        key.span(),
                        format!("Unknown attribute: {}", value),
                    ));
                }
            }

            if input.is_empty() {
                break;
            }
            input.parse::<Token![,]>()?;
        }

        let (_, layers) = require_attr(input.span(), ATTR_LAYERS, layers)?;

        Ok(LayersDef {
            alias_resolver,
            layers,
        })
    }
}

impl LayersDef<KeyAction> {
    fn alias_resolver_tokens(&self) -> TokenStream {
        match &self.alias_resolver {
            Some(path) => path.to_token_stream(),
            None => quote! {
                ::thkb_core::default_key_from_alias
            },
        }
    }

    /// `u:` aliases are meaningless to the default resolver, so they are
    /// rejected upfront instead of failing inside its expansion.
    fn ensure_user_aliases_resolvable(&self) -> syn::Result<()> {
        if self.alias_resolver.is_some() {
            return Ok(());
        }

        let errors = self
            .layers
            .iter()
            .flat_map(|layer| layer.rows.iter())
            .flat_map(|row| row.actions.iter())
            .filter_map(|action| match action {
                KeyAction::Alias { prefix, name } if prefix == USER_PREFIX => {
                    Some(syn::Error::new(
                        action.span(),
                        format!(
                            "Key {}:{} requires an alias_resolver to be set",
                            prefix, name
                        ),
                    ))
                }
                _ => None,
            })
            .collect::<Vec<_>>();

        match combine_syn_errors(&errors) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn resolve_references(&self) -> syn::Result<ResolvedLayersDef<KeyAction>> {
        fn find_resolved(
            name: &str,
            layer_acc: &[Rc<ResolvedLayerDef<KeyAction>>],
        ) -> Option<Rc<ResolvedLayerDef<KeyAction>>> {
            layer_acc
                .iter()
                .find(|resolved_layer| resolved_layer.name == name)
                .cloned()
        }

        fn resolve_layer(
            this: &LayersDef<KeyAction>,
            source_layer: &LayerDef<KeyAction>,
            current_path: &mut Vec<String>,
            resolved_layers: &mut Vec<Rc<ResolvedLayerDef<KeyAction>>>,
        ) -> syn::Result<Rc<ResolvedLayerDef<KeyAction>>> {
            if let Some(resolved) = find_resolved(&source_layer.name.value(), resolved_layers) {
                return Ok(resolved);
            }

            let resolved_parent = match &source_layer.parent {
                Some(parent_name) => {
                    let Some(parent) = this
                        .layers
                        .iter()
                        .find(|layer| layer.name.value() == parent_name.value())
                    else {
                        return Err(syn::Error::new(
                            parent_name.span(),
                            format!("Couldn't find a layer with name '{}'", &parent_name.value()),
                        ));
                    };
                    let cycle_found = current_path.contains(&parent.name.value());
                    current_path.push(parent.name.value());
                    if cycle_found {
                        return Err(syn::Error::new(
                            parent_name.span(),
                            format!(
                                "Cyclic dependency found between layers: {}",
                                current_path.join(" -> ")
                            ),
                        ));
                    }
                    let resolved = resolve_layer(this, parent, current_path, resolved_layers)?;
                    current_path.pop();
                    Some(resolved)
                }
                None => None,
            };

            let resolved = Rc::new(ResolvedLayerDef {
                name: source_layer.name.value(),
                parent: resolved_parent,
                rows: source_layer.rows.clone(),
            });

            resolved_layers.push(Rc::clone(&resolved));
            Ok(resolved)
        }

        fn track_visited_layer(defined_layers: &mut Vec<String>, next: &LitStr) -> syn::Result<()> {
            let name = next.value();
            if defined_layers.contains(&name) {
                Err(syn::Error::new(
                    next.span(),
                    format!("Layer already defined: {}", &name),
                ))
            } else {
                defined_layers.push(name);
                Ok(())
            }
        }

        fn ensure_rows_same_length(layer: &LayerDef<KeyAction>) -> syn::Result<usize> {
            let Some(expected_cols) = layer.rows.first().map(|r| r.actions.len()) else {
                return Ok(0);
            };

            for row in layer.rows.iter() {
                if row.actions.len() != expected_cols {
                    return Err(syn::Error::new(
                        row.span,
                        format!(
                            "Expected every row to have the same dimension. Expected {} elements, but {} got.",
                            expected_cols,
                            row.actions.len()
                        ),
                    ));
                }
            }

            Ok(expected_cols)
        }

        let Some(first_layer) = self.layers.first() else {
            return Err(syn::Error::new(
                Span::call_site(),
                "At least one layer must be defined",
            ));
        };

        self.ensure_user_aliases_resolvable()?;

        let mut resolved_layers = Vec::new();
        let mut already_defined_layers = Vec::new();

        let expected_col_count = ensure_rows_same_length(first_layer)?;
        let expected_row_count = first_layer.rows.len();

        let layers = self.layers.iter().map(|layer| {
            let col_count = ensure_rows_same_length(layer)?;
            if expected_col_count != col_count || expected_row_count != layer.rows.len() {
                return Err(syn::Error::new(layer.rows_span, format!("Expected every layer to have the same dimensions as the firstly defined layer. Expected a layer of {}x{}, but found {}x{}.", expected_row_count, expected_col_count, layer.rows.len(), col_count)));
            }

            track_visited_layer(&mut already_defined_layers, &layer.name)?;
            resolve_layer(self, layer, &mut Vec::new(), &mut resolved_layers)
        }).collect::<ResultAcc<_, _>>().into_syn_result()?;

        Ok(ResolvedLayersDef {
            alias_resolver: self.alias_resolver_tokens(),
            layers,
        })
    }
}

impl ResolvedLayersDef<KeyAction> {
    /// Replaces every passthrough key with the key at the same position on
    /// the parent layer. With no parent, passthrough keys stay transparent
    /// and get resolved by the active layers at runtime.
    fn flatten_rows(
        &self,
        layer: &ResolvedLayerDef<KeyAction>,
        parent: Option<&Rc<ResolvedLayerDef<ConcreteKeyAction>>>,
    ) -> ResolvedLayerDef<ConcreteKeyAction> {
        let rows = layer
            .rows
            .iter()
            .enumerate()
            .map(|(row_idx, row)| LayerRow {
                span: row.span,
                actions: row
                    .actions
                    .iter()
                    .enumerate()
                    .map(|(action_idx, action)| {
                        match (action.concretize(&self.alias_resolver), parent) {
                            (Some(concrete), _) => concrete,
                            (None, Some(parent)) => {
                                parent.rows[row_idx].actions[action_idx].clone()
                            }
                            (None, None) => ConcreteKeyAction::Transparent,
                        }
                    })
                    .collect::<Vec<_>>(),
            })
            .collect::<Vec<_>>();

        ResolvedLayerDef {
            name: layer.name.clone(),
            parent: parent.cloned(),
            rows,
        }
    }

    fn flatten_layer(
        &self,
        layer: &Rc<ResolvedLayerDef<KeyAction>>,
        flattened_layers: &mut Vec<Rc<ResolvedLayerDef<ConcreteKeyAction>>>,
    ) -> Rc<ResolvedLayerDef<ConcreteKeyAction>> {
        if let Some(existing) = flattened_layers.iter().find(|l| l.name == layer.name) {
            return Rc::clone(existing);
        }

        let flattened_parent = layer
            .parent
            .as_ref()
            .map(|parent| self.flatten_layer(parent, flattened_layers));

        let result_layer = Rc::new(self.flatten_rows(layer, flattened_parent.as_ref()));
        flattened_layers.push(Rc::clone(&result_layer));
        result_layer
    }

    fn flatten(&self) -> ResolvedLayersDef<ConcreteKeyAction> {
        let mut layers_acc = Vec::new();

        let layers = self
            .layers
            .iter()
            .map(|layer| self.flatten_layer(layer, &mut layers_acc))
            .collect::<Vec<_>>();

        ResolvedLayersDef {
            alias_resolver: self.alias_resolver.clone(),
            layers,
        }
    }
}

impl ToTokens for ConcreteKeyAction {
    #[allow(non_snake_case)]
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let Keycode = thkb_core_symbol("keycode", "Keycode");
        let keycode = match self {
            ConcreteKeyAction::NoOp => quote! {
                #Keycode::NoOp
            },
            ConcreteKeyAction::Transparent => quote! {
                #Keycode::Transparent
            },
            ConcreteKeyAction::StandardKey(key_ref) => {
                let (usage, shifted) = keymap::translate_standard_key_ref_into_hid_key(key_ref);
                if shifted {
                    quote! { #Keycode::Shifted(#usage) }
                } else {
                    quote! { #Keycode::Basic(#usage) }
                }
            }
            ConcreteKeyAction::ShiftedKey(key_ref) => {
                let (usage, _) = keymap::translate_standard_key_ref_into_hid_key(key_ref);
                quote! { #Keycode::Shifted(#usage) }
            }
            ConcreteKeyAction::Alias {
                resolver,
                prefix,
                name,
            } => quote! {
                #resolver!(#prefix:#name)
            },
        };

        tokens.append_all(keycode);
    }
}

impl ToTokens for LayerRow<ConcreteKeyAction> {
    #[allow(non_snake_case)]
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let LayerRow = thkb_core_symbol("layout", "LayerRow");
        let actions = &self.actions;
        tokens.append_all(quote! {
            #LayerRow::new([
                #(#actions),*
            ])
        })
    }
}

impl ToTokens for ResolvedLayerDef<ConcreteKeyAction> {
    #[allow(non_snake_case)]
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let LayoutLayer = thkb_core_symbol("layout", "LayoutLayer");
        let rows = &self.rows;
        tokens.append_all(quote! {
            #LayoutLayer::new([
                #(#rows),*
            ])
        });
    }
}

impl ResolvedLayersDef<ConcreteKeyAction> {
    fn gen_layers_code(&self) -> TokenStream {
        let layers = &self.layers;
        quote! {
            [
                #(#layers),*
            ]
        }
    }
}

fn expand_layers(input: TokenStream) -> syn::Result<TokenStream> {
    let def = syn::parse2::<LayersDef<KeyAction>>(input)?;
    Ok(def.resolve_references()?.flatten().gen_layers_code())
}

/// Builds the array of layers of a layout, in definition order. Each layer
/// is a `{ name, parent, rows }` block:
///
/// - `A`, `Esc`, `1`, `'['`: standard keys. Symbols that need shift, like
///   `'!'`, are sent along with it.
/// - `s:K`: the key `K` sent along with shift.
/// - `c:`, `m:`, `f:` and `u:` aliases, expanded through `alias_resolver`,
///   or through `thkb_core::default_key_from_alias` if none is given.
/// - `_`: a key that does nothing.
/// - `*`: the key of the parent layer, or a transparent key if the layer
///   has no parent.
#[proc_macro]
pub fn layers(item: proc_macro::TokenStream) -> proc_macro::TokenStream {
    match expand_layers(item.into()) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(input: TokenStream) -> String {
        expand_layers(input).unwrap().to_string().replace(' ', "")
    }

    fn expand_err(input: TokenStream) -> String {
        expand_layers(input).unwrap_err().to_string()
    }

    #[test]
    fn test_standard_and_shifted_keys() {
        let out = expand(quote! {
            layers: [
                { name: "base", rows: [[A, '!', s:B, _, "'"]] },
            ]
        });

        assert_eq!(
            out,
            "[::thkb_core::layout::LayoutLayer::new([::thkb_core::layout::LayerRow::new([\
             ::thkb_core::keycode::Keycode::Basic(::thkb_core::keycode::KeyboardUsage::KeyboardAa),\
             ::thkb_core::keycode::Keycode::Shifted(::thkb_core::keycode::KeyboardUsage::Keyboard1Exclamation),\
             ::thkb_core::keycode::Keycode::Shifted(::thkb_core::keycode::KeyboardUsage::KeyboardBb),\
             ::thkb_core::keycode::Keycode::NoOp,\
             ::thkb_core::keycode::Keycode::Basic(::thkb_core::keycode::KeyboardUsage::KeyboardSingleDoubleQuote)\
             ])])]"
        );
    }

    #[test]
    fn test_bare_layer_list() {
        let out = expand(quote! {
            { name: "base", rows: [[Esc], [Tab]] }
        });
        assert!(out.contains("KeyboardUsage::KeyboardEscape"));
        assert!(out.contains("KeyboardUsage::KeyboardTab"));
    }

    #[test]
    fn test_passthrough_without_parent_is_transparent() {
        let out = expand(quote! {
            layers: [
                { name: "base", rows: [[A, B]] },
                { name: "lower", rows: [[*, C]] },
            ]
        });
        assert!(out.contains("Keycode::Transparent,::thkb_core::keycode::Keycode::Basic(::thkb_core::keycode::KeyboardUsage::KeyboardCc)"));
    }

    #[test]
    fn test_passthrough_copies_parent() {
        let out = expand(quote! {
            layers: [
                { name: "base", rows: [[A, B]] },
                { name: "lower", parent: "base", rows: [[*, C]] },
            ]
        });
        assert!(!out.contains("Transparent"));
        assert_eq!(out.matches("KeyboardUsage::KeyboardAa").count(), 2);
    }

    #[test]
    fn test_aliases_use_resolver() {
        let out = expand(quote! {
            alias_resolver: board_key_from_alias,
            layers: [
                { name: "base", rows: [[u:Lower, c:Ply]] },
            ]
        });
        assert!(out.contains("board_key_from_alias!(u:Lower)"));
        assert!(out.contains("board_key_from_alias!(c:Ply)"));
    }

    #[test]
    fn test_aliases_default_resolver() {
        let out = expand(quote! {
            layers: [
                { name: "base", rows: [[f:Reset, m:Btn1]] },
            ]
        });
        assert!(out.contains("::thkb_core::default_key_from_alias!(f:Reset)"));
        assert!(out.contains("::thkb_core::default_key_from_alias!(m:Btn1)"));
    }

    #[test]
    fn test_user_alias_requires_resolver() {
        let err = expand_err(quote! {
            layers: [
                { name: "base", rows: [[u:Lower]] },
            ]
        });
        assert!(err.contains("alias_resolver"));
    }

    #[test]
    fn test_unknown_prefix() {
        let err = expand_err(quote! {
            layers: [
                { name: "base", rows: [[z:Foo]] },
            ]
        });
        assert!(err.contains("Unknown key prefix 'z'"));
    }

    #[test]
    fn test_unknown_literal() {
        let err = expand_err(quote! {
            layers: [
                { name: "base", rows: [['é']] },
            ]
        });
        assert!(err.contains("Unknown key"));

        let err = expand_err(quote! {
            layers: [
                { name: "base", rows: [["ab"]] },
            ]
        });
        assert!(err.contains("exactly one character"));
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = expand_err(quote! {
            layers: [
                { name: "base", rows: [[A, B], [C]] },
            ]
        });
        assert!(err.contains("same dimension"));

        let err = expand_err(quote! {
            layers: [
                { name: "base", rows: [[A, B]] },
                { name: "lower", rows: [[A, B], [C, D]] },
            ]
        });
        assert!(err.contains("Expected a layer of 1x2, but found 2x2"));
    }

    #[test]
    fn test_layer_references() {
        let err = expand_err(quote! {
            layers: [
                { name: "base", rows: [[A]] },
                { name: "base", rows: [[B]] },
            ]
        });
        assert!(err.contains("Layer already defined: base"));

        let err = expand_err(quote! {
            layers: [
                { name: "base", parent: "missing", rows: [[A]] },
            ]
        });
        assert!(err.contains("Couldn't find a layer with name 'missing'"));

        let err = expand_err(quote! {
            layers: [
                { name: "a", parent: "b", rows: [[A]] },
                { name: "b", parent: "a", rows: [[B]] },
            ]
        });
        assert!(err.contains("Cyclic dependency"));
    }

    #[test]
    fn test_no_layers() {
        let err = expand_err(quote! { layers: [] });
        assert!(err.contains("At least one layer"));
    }
}
