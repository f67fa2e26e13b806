use proc_macro2::{Span, TokenStream};
use quote::format_ident;
use rustc_hash::FxHashSet;
use syn::{
    Attribute, Fields, Generics, Ident, Item, ItemStruct, Type, Visibility,
    ext::IdentExt,
    parse::{Parse, ParseStream},
    parse_quote,
};

use crate::{
    capability::{Capability, CapabilitySet, extract_capabilities},
    diagnostic::{Diagnostic, DiagnosticKind},
    field::{FieldInfo, parse_field},
    options::{InitVisibility, ValueOptions},
    signature::MemberSignature,
};

/// Members written by hand next to the declaration, inside a `declare!` block.
#[derive(Debug, Default)]
pub struct ManualMembers {
    signatures: FxHashSet<MemberSignature>,
    /// Last path segment of every trait implemented for the type.
    traits: FxHashSet<String>,
    has_coding_key: bool,
}

impl ManualMembers {
    pub fn collect(items: &[Item], self_ident: &Ident) -> Self {
        let coding_key = coding_key_ident(self_ident);
        let mut members = ManualMembers::default();
        for item in items {
            match item {
                Item::Impl(item_impl) if is_impl_for(&item_impl.self_ty, self_ident) => {
                    let scope = match &item_impl.trait_ {
                        Some((None, path, _)) => Some(path),
                        // `impl !Trait for T` provides nothing.
                        Some((Some(_), _, _)) => continue,
                        None => None,
                    };
                    if let Some(name) = scope.and_then(|path| path.segments.last()) {
                        members.traits.insert(name.ident.to_string());
                    }
                    for impl_item in &item_impl.items {
                        if let syn::ImplItem::Fn(method) = impl_item {
                            members.signatures.insert(MemberSignature::new(
                                scope,
                                &item_impl.generics,
                                &method.sig,
                                self_ident,
                            ));
                        }
                    }
                }
                Item::Enum(item_enum) if item_enum.ident == coding_key => {
                    members.has_coding_key = true;
                }
                _ => {}
            }
        }
        members
    }

    /// Whether a member equivalent to the one `capability` synthesizes already exists.
    pub fn covers(&self, capability: Capability, self_ident: &Ident) -> bool {
        match MemberSignature::required(capability, self_ident) {
            Some(required) => self.signatures.contains(&required),
            None => self.traits.contains(capability.trait_name()),
        }
    }

    pub fn has_coding_key(&self) -> bool {
        self.has_coding_key
    }
}

fn is_impl_for(self_ty: &Type, self_ident: &Ident) -> bool {
    match self_ty {
        Type::Path(type_path) if type_path.qself.is_none() => type_path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == *self_ident),
        Type::Group(group) => is_impl_for(&group.elem, self_ident),
        _ => false,
    }
}

fn coding_key_ident(ident: &Ident) -> Ident {
    format_ident!("{}CodingKey", ident.unraw())
}

/// An analyzed value declaration, ready for synthesis.
#[derive(Debug)]
pub struct Declaration {
    /// Attributes of the type minus recognized derives and `Clone`.
    pub attrs: Vec<Attribute>,
    pub vis: Visibility,
    pub ident: Ident,
    pub generics: Generics,
    /// Tagged stored fields, in declaration order.
    pub fields: Vec<FieldInfo>,
    /// Fields without a mutability tag. They are left out of the generated type.
    pub skipped_fields: Vec<Ident>,
    pub options: ValueOptions,
    pub requested: CapabilitySet,
    pub synthesized: CapabilitySet,
    /// Requested capabilities the declaration already implements by hand.
    pub suppressed: Vec<Capability>,
    pub manual: ManualMembers,
}

impl Declaration {
    /// `{Type}Storage`
    pub fn storage_ident(&self) -> Ident {
        format_ident!("{}Storage", self.ident.unraw())
    }

    /// `{Type}CodingKey`
    pub fn coding_key_ident(&self) -> Ident {
        coding_key_ident(&self.ident)
    }

    pub fn synthesizes(&self, capability: Capability) -> bool {
        self.synthesized.contains(capability)
    }

    /// Generated serialization code refers to the coding key enum.
    pub fn needs_coding_key(&self) -> bool {
        self.synthesizes(Capability::Decode) || self.synthesizes(Capability::Encode)
    }

    pub fn emits_coding_key(&self) -> bool {
        self.needs_coding_key() && !self.manual.has_coding_key()
    }

    /// A synthesized `Hash` next to a hand-written `PartialEq` may break `a == b => hash(a) ==
    /// hash(b)`.
    pub fn hash_relies_on_manual_equality(&self) -> bool {
        self.synthesizes(Capability::Hashing) && self.suppressed.contains(&Capability::Equality)
    }

    pub fn has_type_params(&self) -> bool {
        self.generics.type_params().next().is_some()
    }

    pub fn constructor_vis(&self) -> Visibility {
        match self.options.init_visibility {
            InitVisibility::Inherit => self.vis.clone(),
            InitVisibility::Internal => parse_quote!(pub(crate)),
            InitVisibility::Public => parse_quote!(pub),
        }
    }
}

/// Analyzes a struct, given the options of its `#[value]` tag and any items written next to it.
pub fn analyze(
    options: ValueOptions,
    item: ItemStruct,
    companions: &[Item],
) -> Result<Declaration, Diagnostic> {
    let _span = tracing::debug_span!("analyze", ty = %item.ident).entered();

    let named = match item.fields {
        Fields::Named(named) => named.named,
        Fields::Unnamed(unnamed) => {
            return Err(Diagnostic::structural(
                &unnamed,
                "#[value] requires a struct with named fields, found a tuple struct",
            ));
        }
        Fields::Unit => {
            return Err(Diagnostic::structural(
                &item.ident,
                "#[value] requires a struct with named fields, found a unit struct",
            ));
        }
    };

    let mut fields = Vec::with_capacity(named.len());
    let mut skipped_fields = Vec::new();
    for field in &named {
        match parse_field(field)? {
            Some(info) => fields.push(info),
            None => {
                let Some(ident) = field.ident.clone() else {
                    continue;
                };
                tracing::debug!(
                    field = %ident,
                    "field has no #[exclusive] or #[shared] tag, leaving it out"
                );
                skipped_fields.push(ident);
            }
        }
    }

    let (mut requested, attrs) = extract_capabilities(item.attrs)?;
    if options.serde {
        requested.insert_serialization();
    }

    if requested.contains(Capability::Decode) || requested.contains(Capability::Encode) {
        check_key_variants(&fields)?;
    }

    let manual = ManualMembers::collect(companions, &item.ident);
    let mut synthesized = CapabilitySet::default();
    let mut suppressed = Vec::new();
    for capability in requested.iter() {
        if manual.covers(capability, &item.ident) {
            tracing::debug!(
                capability = capability.trait_name(),
                "found an equivalent hand-written member, not synthesizing"
            );
            suppressed.push(capability);
        } else {
            synthesized.insert(capability);
        }
    }

    Ok(Declaration {
        attrs,
        vis: item.vis,
        ident: item.ident,
        generics: item.generics,
        fields,
        skipped_fields,
        options,
        requested,
        synthesized,
        suppressed,
        manual,
    })
}

fn check_key_variants(fields: &[FieldInfo]) -> Result<(), Diagnostic> {
    for (index, field) in fields.iter().enumerate() {
        if let Some(previous) = fields[..index]
            .iter()
            .find(|previous| previous.key_variant == field.key_variant)
        {
            return Err(Diagnostic::structural(
                &field.field_name,
                format!(
                    "fields `{}` and `{}` map to the same coding key variant `{}`",
                    previous.key(),
                    field.key(),
                    field.key_variant
                ),
            ));
        }
    }
    Ok(())
}

/// Analyzes the item a `#[value(<args>)]` attribute was applied to.
pub fn analyze_attribute(args: TokenStream, item: TokenStream) -> Result<Declaration, Diagnostic> {
    let options = syn::parse2::<ValueOptions>(args)
        .map_err(|e| Diagnostic::from_syn(DiagnosticKind::TagUsageError, e))?;
    let item = syn::parse2::<Item>(item)
        .map_err(|e| Diagnostic::from_syn(DiagnosticKind::StructuralError, e))?;
    analyze(options, expect_struct(item)?, &[])
}

fn expect_struct(item: Item) -> Result<ItemStruct, Diagnostic> {
    let found = match &item {
        Item::Struct(_) => None,
        Item::Enum(item) => Some((item.ident.span(), "an enum")),
        Item::Union(item) => Some((item.ident.span(), "a union")),
        Item::Trait(item) => Some((item.ident.span(), "a trait")),
        Item::Fn(item) => Some((item.sig.ident.span(), "a function")),
        Item::Type(item) => Some((item.ident.span(), "a type alias")),
        Item::Impl(_) => Some((Span::call_site(), "an impl block")),
        _ => Some((Span::call_site(), "an item that isn't a struct")),
    };
    match (item, found) {
        (Item::Struct(item), _) => Ok(item),
        (_, Some((span, kind))) => Err(Diagnostic::new(
            DiagnosticKind::StructuralError,
            span,
            format!("#[value] can only be applied to structs with named fields, found {kind}"),
        )),
        (_, None) => Err(Diagnostic::new(
            DiagnosticKind::StructuralError,
            Span::call_site(),
            "#[value] can only be applied to structs with named fields",
        )),
    }
}

/// Analyzes an item of a parsed source file. Returns `None` when the item carries no `#[value]`
/// attribute.
pub fn analyze_item(mut item: Item) -> Option<Result<Declaration, Diagnostic>> {
    let options = match take_value_attribute(&mut item) {
        Ok(Some(options)) => options,
        Ok(None) => return None,
        Err(diagnostic) => return Some(Err(diagnostic)),
    };
    Some(expect_struct(item).and_then(|item| analyze(options, item, &[])))
}

/// Returns `true` for `#[value]`, `#[value(...)]` and `#[turbo_cow::value(...)]`.
pub fn is_value_attribute(attr: &Attribute) -> bool {
    let segments = &attr.path().segments;
    match segments.len() {
        1 => segments[0].ident == "value",
        2 => segments[0].ident == "turbo_cow" && segments[1].ident == "value",
        _ => false,
    }
}

/// The body of `declare! { ... }`: one `#[value]` struct and the items written next to it.
#[derive(Debug)]
pub struct DeclarationBlock {
    pub items: Vec<Item>,
}

impl Parse for DeclarationBlock {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut items = Vec::new();
        while !input.is_empty() {
            items.push(input.parse()?);
        }
        Ok(DeclarationBlock { items })
    }
}

/// Analyzes a `declare!` block. Returns the declaration and the companion items, which are emitted
/// unchanged after the synthesized code.
pub fn analyze_block(block: DeclarationBlock) -> Result<(Declaration, Vec<Item>), Diagnostic> {
    let mut tagged: Option<(ValueOptions, Item)> = None;
    let mut companions = Vec::with_capacity(block.items.len());

    for mut item in block.items {
        let Some(options) = take_value_attribute(&mut item)? else {
            companions.push(item);
            continue;
        };
        if tagged.is_some() {
            return Err(Diagnostic::structural(
                &item,
                "declare! accepts exactly one #[value] declaration",
            ));
        }
        tagged = Some((options, item));
    }

    let Some((options, item)) = tagged else {
        return Err(Diagnostic::new(
            DiagnosticKind::StructuralError,
            Span::call_site(),
            "declare! requires a struct tagged #[value]",
        ));
    };

    let declaration = analyze(options, expect_struct(item)?, &companions)?;
    Ok((declaration, companions))
}

/// Removes the `#[value]` attribute from `item` and parses its options.
fn take_value_attribute(item: &mut Item) -> Result<Option<ValueOptions>, Diagnostic> {
    let Some(attrs) = item_attrs_mut(item) else {
        return Ok(None);
    };
    let Some(position) = attrs.iter().position(is_value_attribute) else {
        return Ok(None);
    };
    let attr = attrs.remove(position);
    if let Some(duplicate) = attrs.iter().find(|attr| is_value_attribute(attr)) {
        return Err(Diagnostic::tag_usage(duplicate, "duplicate #[value] tag"));
    }
    ValueOptions::from_attribute(&attr)
        .map(Some)
        .map_err(|e| Diagnostic::from_syn(DiagnosticKind::TagUsageError, e))
}

fn item_attrs_mut(item: &mut Item) -> Option<&mut Vec<Attribute>> {
    Some(match item {
        Item::Const(item) => &mut item.attrs,
        Item::Enum(item) => &mut item.attrs,
        Item::ExternCrate(item) => &mut item.attrs,
        Item::Fn(item) => &mut item.attrs,
        Item::ForeignMod(item) => &mut item.attrs,
        Item::Impl(item) => &mut item.attrs,
        Item::Macro(item) => &mut item.attrs,
        Item::Mod(item) => &mut item.attrs,
        Item::Static(item) => &mut item.attrs,
        Item::Struct(item) => &mut item.attrs,
        Item::Trait(item) => &mut item.attrs,
        Item::TraitAlias(item) => &mut item.attrs,
        Item::Type(item) => &mut item.attrs,
        Item::Union(item) => &mut item.attrs,
        Item::Use(item) => &mut item.attrs,
        _ => return None,
    })
}
