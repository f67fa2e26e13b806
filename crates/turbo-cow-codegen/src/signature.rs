//! Structural comparison of member signatures.
//!
//! A capability is only synthesized when the declaration doesn't already provide an equivalent
//! member. Two signatures are equivalent when they have the same name, trait scope, receiver,
//! normalized parameter types and effects. Parameter names and lifetimes don't matter, and paths
//! compare by their last segment, so `fmt::Formatter`, `::core::fmt::Formatter` and `Formatter` are
//! the same type.

use std::mem::take;

use syn::{
    FnArg, GenericArgument, Generics, Ident, Path, PathArguments, ReturnType, Signature, Type,
    TypeParamBound, parse_quote,
    punctuated::Punctuated,
    visit_mut::{self, VisitMut},
};

use crate::capability::Capability;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Receiver {
    /// An associated function.
    None,
    Value,
    Ref,
    RefMut,
}

impl Receiver {
    fn of(sig: &Signature) -> Self {
        let Some(receiver) = sig.receiver() else {
            return Receiver::None;
        };
        if receiver.reference.is_some() {
            return if receiver.mutability.is_some() {
                Receiver::RefMut
            } else {
                Receiver::Ref
            };
        }
        // `self: &Self`, `self: &mut Self`
        match &*receiver.ty {
            Type::Reference(reference) if reference.mutability.is_some() => Receiver::RefMut,
            Type::Reference(_) => Receiver::Ref,
            _ => Receiver::Value,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Effects {
    pub is_async: bool,
    pub is_unsafe: bool,
    pub is_const: bool,
    /// The return type is a `Result`.
    pub is_fallible: bool,
}

impl Effects {
    fn of(sig: &Signature) -> Self {
        let is_fallible = match &sig.output {
            ReturnType::Type(_, ty) => match &**ty {
                Type::Path(type_path) => type_path
                    .path
                    .segments
                    .last()
                    .is_some_and(|segment| segment.ident == "Result"),
                _ => false,
            },
            ReturnType::Default => false,
        };
        Effects {
            is_async: sig.asyncness.is_some(),
            is_unsafe: sig.unsafety.is_some(),
            is_const: sig.constness.is_some(),
            is_fallible,
        }
    }
}

/// The comparable shape of a method or associated function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberSignature {
    /// Last path segment of the implemented trait, `None` for inherent members.
    pub scope: Option<String>,
    pub name: String,
    pub receiver: Receiver,
    pub params: Vec<Type>,
    pub effects: Effects,
}

impl MemberSignature {
    /// Builds the signature of `sig`, declared in an impl block with `impl_generics` for the type
    /// named `self_ident`, optionally implementing `scope`.
    pub fn new(
        scope: Option<&Path>,
        impl_generics: &Generics,
        sig: &Signature,
        self_ident: &Ident,
    ) -> Self {
        let mut normalizer = Normalizer::new(self_ident, impl_generics, &sig.generics);
        let params = sig
            .inputs
            .iter()
            .filter_map(|arg| match arg {
                FnArg::Typed(pat_type) => Some(normalizer.normalize((*pat_type.ty).clone())),
                FnArg::Receiver(_) => None,
            })
            .collect();

        MemberSignature {
            scope: scope
                .and_then(|path| path.segments.last())
                .map(|segment| segment.ident.to_string()),
            name: sig.ident.to_string(),
            receiver: Receiver::of(sig),
            params,
            effects: Effects::of(sig),
        }
    }

    /// The member a capability would synthesize. `None` for marker capabilities.
    pub fn required(capability: Capability, self_ident: &Ident) -> Option<Self> {
        let (scope, sig): (Path, Signature) = match capability {
            Capability::Description => (
                parse_quote!(Debug),
                parse_quote!(fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result),
            ),
            Capability::Equality => (
                parse_quote!(PartialEq),
                parse_quote!(fn eq(&self, other: &Self) -> bool),
            ),
            Capability::TotalEquality => return None,
            Capability::Hashing => (
                parse_quote!(Hash),
                parse_quote!(fn hash<H: ::core::hash::Hasher>(&self, state: &mut H)),
            ),
            Capability::Decode => (
                parse_quote!(Deserialize<'de>),
                parse_quote!(
                    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error>
                ),
            ),
            Capability::Encode => (
                parse_quote!(Serialize),
                parse_quote!(
                    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error>
                ),
            ),
        };
        Some(Self::new(
            Some(&scope),
            &Generics::default(),
            &sig,
            self_ident,
        ))
    }
}

/// Rewrites a type into the form signatures are compared in.
struct Normalizer<'a> {
    self_ident: &'a Ident,
    /// Type and const parameters of the impl block, renamed to `__I{index}`.
    impl_params: Vec<Ident>,
    /// Type and const parameters of the method, renamed to `__G{index}`, numbered separately from the
    /// impl parameters.
    fn_params: Vec<Ident>,
}

impl<'a> Normalizer<'a> {
    fn new(self_ident: &'a Ident, impl_generics: &Generics, fn_generics: &Generics) -> Self {
        Normalizer {
            self_ident,
            impl_params: generic_param_idents(impl_generics),
            fn_params: generic_param_idents(fn_generics),
        }
    }

    fn normalize(&mut self, mut ty: Type) -> Type {
        self.visit_type_mut(&mut ty);
        ty
    }

    fn placeholder(&self, ident: &Ident) -> Option<Ident> {
        let position = |params: &[Ident]| params.iter().position(|param| param == ident);
        if let Some(index) = position(&self.fn_params) {
            return Some(Ident::new(&format!("__G{index}"), ident.span()));
        }
        position(&self.impl_params).map(|index| Ident::new(&format!("__I{index}"), ident.span()))
    }

    fn is_self_type(&self, ty: &Type) -> bool {
        matches!(
            ty,
            Type::Path(type_path)
                if type_path.qself.is_none()
                    && type_path.path.segments.len() == 1
                    && type_path.path.segments[0].ident == *self.self_ident
        )
    }
}

fn generic_param_idents(generics: &Generics) -> Vec<Ident> {
    generics
        .type_params()
        .map(|param| param.ident.clone())
        .chain(generics.const_params().map(|param| param.ident.clone()))
        .collect()
}

impl VisitMut for Normalizer<'_> {
    fn visit_type_mut(&mut self, ty: &mut Type) {
        if self.is_self_type(ty) {
            *ty = parse_quote!(Self);
            return;
        }
        if let Type::Paren(paren) = ty {
            let inner = (*paren.elem).clone();
            *ty = inner;
            self.visit_type_mut(ty);
            return;
        }
        visit_mut::visit_type_mut(self, ty);
    }

    fn visit_type_path_mut(&mut self, type_path: &mut syn::TypePath) {
        if let Some(qself) = &mut type_path.qself {
            // `<T as Trait>::Assoc` keeps its trait path.
            self.visit_type_mut(&mut qself.ty);
            for segment in &mut type_path.path.segments {
                self.visit_path_arguments_mut(&mut segment.arguments);
            }
            return;
        }
        self.visit_path_mut(&mut type_path.path);
    }

    fn visit_path_mut(&mut self, path: &mut Path) {
        path.leading_colon = None;
        let Some(first) = path.segments.first().map(|segment| segment.ident.clone()) else {
            return;
        };
        if let Some(placeholder) = self.placeholder(&first) {
            path.segments[0].ident = placeholder;
        } else if first != "Self"
            && path.segments.len() > 1
            && let Some(last) = path.segments.pop()
        {
            path.segments = Punctuated::from_iter([last.into_value()]);
        }
        for segment in &mut path.segments {
            self.visit_path_arguments_mut(&mut segment.arguments);
        }
    }

    fn visit_path_arguments_mut(&mut self, arguments: &mut PathArguments) {
        if let PathArguments::AngleBracketed(angle) = arguments {
            angle.colon2_token = None;
            angle.args = take(&mut angle.args)
                .into_iter()
                .filter(|arg| !matches!(arg, GenericArgument::Lifetime(_)))
                .collect();
            if angle.args.is_empty() {
                *arguments = PathArguments::None;
                return;
            }
        }
        visit_mut::visit_path_arguments_mut(self, arguments);
    }

    fn visit_type_reference_mut(&mut self, reference: &mut syn::TypeReference) {
        reference.lifetime = None;
        visit_mut::visit_type_reference_mut(self, reference);
    }

    fn visit_type_trait_object_mut(&mut self, object: &mut syn::TypeTraitObject) {
        object.bounds = take(&mut object.bounds)
            .into_iter()
            .filter(|bound| !matches!(bound, TypeParamBound::Lifetime(_)))
            .collect();
        visit_mut::visit_type_trait_object_mut(self, object);
    }
}
