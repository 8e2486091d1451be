//! The catalog of known polyfills and alias groups.
//!
//! The builtin catalog ships a representative cut of the upstream polyfill
//! collection: the ECMAScript and DOM features most commonly requested,
//! with their alias groups and browser targeting data. Lookups are by
//! exact name; alias expansion recurses through nested alias groups.

use std::collections::{BTreeMap, BTreeSet};

use super::error::CatalogError;
use super::types::Polyfill;
use crate::ua::{Version, VersionRange};

/// Immutable collection of polyfill definitions and alias groups.
#[derive(Debug, Clone)]
pub struct Catalog {
    polyfills: BTreeMap<String, Polyfill>,
    aliases: BTreeMap<String, Vec<String>>,
}

impl Catalog {
    /// Builds a catalog from polyfill definitions and alias groups.
    pub fn new<P, A, M>(polyfills: P, aliases: A) -> Self
    where
        P: IntoIterator<Item = Polyfill>,
        A: IntoIterator<Item = (M, Vec<M>)>,
        M: Into<String>,
    {
        Self {
            polyfills: polyfills
                .into_iter()
                .map(|p| (p.name.clone(), p))
                .collect(),
            aliases: aliases
                .into_iter()
                .map(|(name, members)| {
                    (
                        name.into(),
                        members.into_iter().map(Into::into).collect(),
                    )
                })
                .collect(),
        }
    }

    /// Checks referential integrity: every dependency and alias member
    /// must name a known polyfill or alias.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for polyfill in self.polyfills.values() {
            for dependency in &polyfill.dependencies {
                if !self.polyfills.contains_key(dependency) {
                    return Err(CatalogError::UnknownDependency {
                        polyfill: polyfill.name.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
        }
        for (alias, members) in &self.aliases {
            for member in members {
                if !self.contains(member) {
                    return Err(CatalogError::UnknownAliasMember {
                        alias: alias.clone(),
                        member: member.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Names of all polyfills, in sorted order.
    pub fn polyfill_names(&self) -> impl Iterator<Item = &str> {
        self.polyfills.keys().map(String::as_str)
    }

    /// Names of all alias groups, in sorted order.
    pub fn alias_names(&self) -> impl Iterator<Item = &str> {
        self.aliases.keys().map(String::as_str)
    }

    /// Looks up a polyfill by exact name.
    pub fn polyfill(&self, name: &str) -> Option<&Polyfill> {
        self.polyfills.get(name)
    }

    /// Returns true if the name is a known polyfill or alias.
    pub fn contains(&self, name: &str) -> bool {
        self.polyfills.contains_key(name) || self.aliases.contains_key(name)
    }

    /// Number of polyfill definitions.
    pub fn polyfill_count(&self) -> usize {
        self.polyfills.len()
    }

    /// Number of alias groups.
    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    /// Expands a feature name into concrete polyfill names.
    ///
    /// A polyfill name expands to itself; an alias expands recursively
    /// through nested aliases, preserving member order and dropping
    /// duplicates. Unknown names expand to nothing — membership
    /// validation is the caller's concern.
    pub fn expand(&self, name: &str) -> Vec<String> {
        let mut result = Vec::new();
        let mut seen = BTreeSet::new();
        self.expand_into(name, &mut result, &mut seen);
        result
    }

    fn expand_into(&self, name: &str, result: &mut Vec<String>, seen: &mut BTreeSet<String>) {
        // `seen` doubles as a cycle guard for alias groups.
        if !seen.insert(name.to_string()) {
            return;
        }
        if self.polyfills.contains_key(name) {
            result.push(name.to_string());
        } else if let Some(members) = self.aliases.get(name) {
            for member in members {
                self.expand_into(member, result, seen);
            }
        }
    }

    /// The builtin catalog shipped with this crate.
    pub fn builtin() -> Self {
        builtin_catalog()
    }
}

const ANY: VersionRange = VersionRange::Any;

const fn below(major: u32) -> VersionRange {
    VersionRange::Below(Version::new(major, 0))
}

const fn below_minor(major: u32, minor: u32) -> VersionRange {
    VersionRange::Below(Version::new(major, minor))
}

fn builtin_catalog() -> Catalog {
    let polyfills = vec![
        Polyfill::new(
            "Array.from",
            r#"Object.defineProperty(Array, 'from', { configurable: true, writable: true, value: function from(items) {
	var list = Object(items);
	var length = list.length >>> 0;
	var result = [];
	for (var i = 0; i < length; i++) { result.push(list[i]); }
	return arguments.length > 1 ? result.map(arguments[1]) : result;
}});"#,
        )
        .with_detect("'from' in Array")
        .with_dependencies(["Symbol.iterator"])
        .with_browser("chrome", below(45))
        .with_browser("firefox", below(32))
        .with_browser("ie", ANY)
        .with_browser("safari", below(9))
        .with_browser("ios_saf", below(9))
        .with_browser("opera", below(32)),
        Polyfill::new(
            "Array.prototype.find",
            r#"Object.defineProperty(Array.prototype, 'find', { configurable: true, writable: true, value: function find(callback) {
	var scope = arguments.length > 1 ? arguments[1] : undefined;
	for (var i = 0; i < this.length; i++) {
		if (callback.call(scope, this[i], i, this)) { return this[i]; }
	}
	return undefined;
}});"#,
        )
        .with_detect("'find' in Array.prototype")
        .with_browser("chrome", below(45))
        .with_browser("firefox", below(25))
        .with_browser("ie", ANY)
        .with_browser("safari", below_minor(7, 1))
        .with_browser("ios_saf", below(8))
        .with_browser("opera", below(32)),
        Polyfill::new(
            "Array.prototype.flat",
            r#"Object.defineProperty(Array.prototype, 'flat', { configurable: true, writable: true, value: function flat() {
	var depth = arguments.length ? Number(arguments[0]) || 0 : 1;
	var result = [];
	(function walk(list, level) {
		list.forEach(function (item) {
			if (Array.isArray(item) && level < depth) { walk(item, level + 1); } else { result.push(item); }
		});
	})(this, 0);
	return result;
}});"#,
        )
        .with_detect("'flat' in Array.prototype")
        .with_browser("chrome", below(69))
        .with_browser("edge", below(79))
        .with_browser("firefox", below(62))
        .with_browser("ie", ANY)
        .with_browser("safari", below(12))
        .with_browser("ios_saf", below(12))
        .with_browser("opera", below(56)),
        Polyfill::new(
            "Array.prototype.includes",
            r#"Object.defineProperty(Array.prototype, 'includes', { configurable: true, writable: true, value: function includes(search) {
	var index = arguments.length > 1 ? arguments[1] : 0;
	for (; index < this.length; index++) {
		if (this[index] === search || (search !== search && this[index] !== this[index])) { return true; }
	}
	return false;
}});"#,
        )
        .with_detect("'includes' in Array.prototype")
        .with_browser("chrome", below(47))
        .with_browser("edge", below(14))
        .with_browser("firefox", below(43))
        .with_browser("ie", ANY)
        .with_browser("safari", below(9))
        .with_browser("ios_saf", below(9))
        .with_browser("samsung", below(5))
        .with_browser("opera", below(34)),
        Polyfill::new(
            "Array.prototype.indexOf",
            r#"Object.defineProperty(Array.prototype, 'indexOf', { configurable: true, writable: true, value: function indexOf(search) {
	var index = arguments.length > 1 ? arguments[1] : 0;
	for (; index < this.length; index++) {
		if (this[index] === search) { return index; }
	}
	return -1;
}});"#,
        )
        .with_detect("'indexOf' in Array.prototype")
        .with_browser("ie", below(9)),
        Polyfill::new(
            "CustomEvent",
            r#"self.CustomEvent = function CustomEvent(type, params) {
	params = params || { bubbles: false, cancelable: false, detail: undefined };
	var event = document.createEvent('CustomEvent');
	event.initCustomEvent(type, params.bubbles, params.cancelable, params.detail);
	return event;
};
self.CustomEvent.prototype = self.Event.prototype;"#,
        )
        .with_detect("'CustomEvent' in self && typeof self.CustomEvent === 'function'")
        .with_browser("ie", ANY)
        .with_browser("safari", below(6))
        .with_browser("ios_saf", below(6)),
        Polyfill::new(
            "Element.prototype.closest",
            r#"Element.prototype.closest = function closest(selector) {
	var node = this;
	while (node && node.nodeType === 1) {
		if (node.matches(selector)) { return node; }
		node = node.parentNode;
	}
	return null;
};"#,
        )
        .with_detect("'Element' in self && 'closest' in Element.prototype")
        .with_dependencies(["Element.prototype.matches"])
        .with_browser("chrome", below(41))
        .with_browser("edge", below(15))
        .with_browser("firefox", below(35))
        .with_browser("ie", ANY)
        .with_browser("safari", below(9))
        .with_browser("ios_saf", below(9))
        .with_browser("opera", below(28)),
        Polyfill::new(
            "Element.prototype.matches",
            r#"Element.prototype.matches = Element.prototype.webkitMatchesSelector || Element.prototype.msMatchesSelector || function matches(selector) {
	var candidates = (this.document || this.ownerDocument).querySelectorAll(selector);
	var index = 0;
	while (candidates[index] && candidates[index] !== this) { index++; }
	return Boolean(candidates[index]);
};"#,
        )
        .with_detect("'Element' in self && 'matches' in Element.prototype")
        .with_browser("chrome", below(34))
        .with_browser("firefox", below(34))
        .with_browser("ie", ANY)
        .with_browser("safari", below_minor(7, 1))
        .with_browser("ios_saf", below(8))
        .with_browser("opera", below(21)),
        Polyfill::new(
            "Map",
            r#"self.Map = (function () {
	function Map() { this._keys = []; this._values = []; this.size = 0; }
	Map.prototype.get = function (key) { var i = this._keys.indexOf(key); return i === -1 ? undefined : this._values[i]; };
	Map.prototype.has = function (key) { return this._keys.indexOf(key) !== -1; };
	Map.prototype.set = function (key, value) {
		var i = this._keys.indexOf(key);
		if (i === -1) { this._keys.push(key); this._values.push(value); this.size++; } else { this._values[i] = value; }
		return this;
	};
	Map.prototype['delete'] = function (key) {
		var i = this._keys.indexOf(key);
		if (i === -1) { return false; }
		this._keys.splice(i, 1); this._values.splice(i, 1); this.size--;
		return true;
	};
	Map.prototype.forEach = function (callback) {
		for (var i = 0; i < this._keys.length; i++) { callback(this._values[i], this._keys[i], this); }
	};
	return Map;
}());"#,
        )
        .with_detect("'Map' in self && 'set' in self.Map.prototype")
        .with_dependencies(["Symbol.iterator"])
        .with_browser("chrome", below(38))
        .with_browser("firefox", below(13))
        .with_browser("ie", below(11))
        .with_browser("safari", below(8))
        .with_browser("ios_saf", below(8))
        .with_browser("opera", below(25)),
        Polyfill::new(
            "Object.assign",
            r#"Object.defineProperty(Object, 'assign', { configurable: true, writable: true, value: function assign(target) {
	var to = Object(target);
	for (var i = 1; i < arguments.length; i++) {
		var source = arguments[i];
		if (source == null) { continue; }
		for (var key in source) {
			if (Object.prototype.hasOwnProperty.call(source, key)) { to[key] = source[key]; }
		}
	}
	return to;
}});"#,
        )
        .with_detect("'assign' in Object")
        .with_browser("chrome", below(45))
        .with_browser("firefox", below(34))
        .with_browser("ie", ANY)
        .with_browser("safari", below(9))
        .with_browser("ios_saf", below(9))
        .with_browser("opera", below(32)),
        Polyfill::new(
            "Object.entries",
            r#"Object.defineProperty(Object, 'entries', { configurable: true, writable: true, value: function entries(object) {
	return Object.keys(object).map(function (key) { return [key, object[key]]; });
}});"#,
        )
        .with_detect("'entries' in Object")
        .with_browser("chrome", below(54))
        .with_browser("edge", below(14))
        .with_browser("firefox", below(47))
        .with_browser("ie", ANY)
        .with_browser("safari", below_minor(10, 1))
        .with_browser("ios_saf", below_minor(10, 3))
        .with_browser("opera", below(41)),
        Polyfill::new(
            "Promise",
            r#"self.Promise = (function () {
	function Promise(executor) {
		var state = 'pending', value, handlers = [];
		function settle(next) {
			return function (result) {
				if (state !== 'pending') { return; }
				state = next; value = result;
				handlers.forEach(handle); handlers = [];
			};
		}
		function handle(handler) {
			if (state === 'pending') { handlers.push(handler); return; }
			setTimeout(function () { handler(state, value); }, 0);
		}
		this.then = function (onFulfilled, onRejected) {
			return new Promise(function (resolve, reject) {
				handle(function (state, value) {
					try {
						if (state === 'fulfilled') { resolve(onFulfilled ? onFulfilled(value) : value); }
						else if (onRejected) { resolve(onRejected(value)); }
						else { reject(value); }
					} catch (error) { reject(error); }
				});
			});
		};
		this['catch'] = function (onRejected) { return this.then(undefined, onRejected); };
		try { executor(settle('fulfilled'), settle('rejected')); } catch (error) { settle('rejected')(error); }
	}
	Promise.resolve = function (value) { return new Promise(function (resolve) { resolve(value); }); };
	Promise.reject = function (reason) { return new Promise(function (resolve, reject) { reject(reason); }); };
	Promise.all = function (promises) {
		return new Promise(function (resolve, reject) {
			var results = [], pending = promises.length;
			if (!pending) { return resolve(results); }
			promises.forEach(function (promise, i) {
				Promise.resolve(promise).then(function (value) {
					results[i] = value;
					if (--pending === 0) { resolve(results); }
				}, reject);
			});
		});
	};
	return Promise;
}());"#,
        )
        .with_detect("'Promise' in self")
        .with_browser("chrome", below(33))
        .with_browser("firefox", below(29))
        .with_browser("ie", ANY)
        .with_browser("safari", below_minor(7, 1))
        .with_browser("ios_saf", below(8))
        .with_browser("opera", below(20)),
        Polyfill::new(
            "Promise.prototype.finally",
            r#"Promise.prototype['finally'] = function (callback) {
	return this.then(
		function (value) { return Promise.resolve(callback()).then(function () { return value; }); },
		function (reason) { return Promise.resolve(callback()).then(function () { throw reason; }); }
	);
};"#,
        )
        .with_detect("'Promise' in self && 'finally' in self.Promise.prototype")
        .with_dependencies(["Promise"])
        .with_browser("chrome", below(63))
        .with_browser("edge", below(18))
        .with_browser("firefox", below(58))
        .with_browser("ie", ANY)
        .with_browser("safari", below_minor(11, 1))
        .with_browser("ios_saf", below_minor(11, 3))
        .with_browser("opera", below(50)),
        Polyfill::new(
            "Set",
            r#"self.Set = (function () {
	function Set() { this._values = []; this.size = 0; }
	Set.prototype.has = function (value) { return this._values.indexOf(value) !== -1; };
	Set.prototype.add = function (value) {
		if (!this.has(value)) { this._values.push(value); this.size++; }
		return this;
	};
	Set.prototype['delete'] = function (value) {
		var i = this._values.indexOf(value);
		if (i === -1) { return false; }
		this._values.splice(i, 1); this.size--;
		return true;
	};
	Set.prototype.forEach = function (callback) {
		for (var i = 0; i < this._values.length; i++) { callback(this._values[i], this._values[i], this); }
	};
	return Set;
}());"#,
        )
        .with_detect("'Set' in self && 'add' in self.Set.prototype")
        .with_dependencies(["Symbol.iterator"])
        .with_browser("chrome", below(38))
        .with_browser("firefox", below(13))
        .with_browser("ie", below(11))
        .with_browser("safari", below(8))
        .with_browser("ios_saf", below(8))
        .with_browser("opera", below(25)),
        Polyfill::new(
            "String.prototype.includes",
            r#"Object.defineProperty(String.prototype, 'includes', { configurable: true, writable: true, value: function includes(search) {
	return this.indexOf(search, arguments.length > 1 ? arguments[1] : 0) !== -1;
}});"#,
        )
        .with_detect("'includes' in String.prototype")
        .with_browser("chrome", below(41))
        .with_browser("firefox", below(40))
        .with_browser("ie", ANY)
        .with_browser("safari", below(9))
        .with_browser("ios_saf", below(9))
        .with_browser("opera", below(28)),
        Polyfill::new(
            "String.prototype.padStart",
            r#"Object.defineProperty(String.prototype, 'padStart', { configurable: true, writable: true, value: function padStart(targetLength, padString) {
	var result = String(this);
	padString = padString === undefined ? ' ' : String(padString);
	while (result.length < targetLength && padString.length) {
		result = padString.slice(0, targetLength - result.length) + result;
	}
	return result;
}});"#,
        )
        .with_detect("'padStart' in String.prototype")
        .with_browser("chrome", below(57))
        .with_browser("edge", below(15))
        .with_browser("firefox", below(48))
        .with_browser("ie", ANY)
        .with_browser("safari", below(10))
        .with_browser("ios_saf", below(10))
        .with_browser("opera", below(44)),
        Polyfill::new(
            "String.prototype.startsWith",
            r#"Object.defineProperty(String.prototype, 'startsWith', { configurable: true, writable: true, value: function startsWith(search) {
	var position = arguments.length > 1 ? arguments[1] : 0;
	return this.slice(position, position + search.length) === search;
}});"#,
        )
        .with_detect("'startsWith' in String.prototype")
        .with_browser("chrome", below(41))
        .with_browser("firefox", below(17))
        .with_browser("ie", ANY)
        .with_browser("safari", below(9))
        .with_browser("ios_saf", below(9))
        .with_browser("opera", below(28)),
        Polyfill::new(
            "Symbol",
            r#"self.Symbol = (function () {
	var counter = 0;
	function Symbol(description) {
		if (this instanceof Symbol) { throw new TypeError('Symbol is not a constructor'); }
		return '@@Symbol(' + String(description) + '):' + counter++;
	}
	Symbol['for'] = function (key) { return '@@Symbol(' + String(key) + ')'; };
	return Symbol;
}());"#,
        )
        .with_detect("'Symbol' in self")
        .with_browser("chrome", below(38))
        .with_browser("firefox", below(36))
        .with_browser("ie", ANY)
        .with_browser("safari", below(9))
        .with_browser("ios_saf", below(9))
        .with_browser("opera", below(25)),
        Polyfill::new(
            "Symbol.iterator",
            r#"Object.defineProperty(self.Symbol, 'iterator', { value: self.Symbol('Symbol.iterator') });"#,
        )
        .with_detect("'Symbol' in self && 'iterator' in self.Symbol")
        .with_dependencies(["Symbol"])
        .with_browser("chrome", below(38))
        .with_browser("firefox", below(36))
        .with_browser("ie", ANY)
        .with_browser("safari", below(9))
        .with_browser("ios_saf", below(9))
        .with_browser("opera", below(25)),
        Polyfill::new(
            "WeakMap",
            r#"self.WeakMap = (function () {
	var counter = 0;
	function WeakMap() { this._id = '@@WeakMap:' + counter++; }
	WeakMap.prototype.get = function (key) { return key && key[this._id] ? key[this._id].value : undefined; };
	WeakMap.prototype.has = function (key) { return Boolean(key && key[this._id]); };
	WeakMap.prototype.set = function (key, value) {
		Object.defineProperty(key, this._id, { configurable: true, value: { value: value } });
		return this;
	};
	WeakMap.prototype['delete'] = function (key) {
		if (!this.has(key)) { return false; }
		delete key[this._id];
		return true;
	};
	return WeakMap;
}());"#,
        )
        .with_detect("'WeakMap' in self")
        .with_browser("chrome", below(36))
        .with_browser("firefox", below(6))
        .with_browser("ie", below(11))
        .with_browser("safari", below(8))
        .with_browser("ios_saf", below(8))
        .with_browser("opera", below(23)),
        Polyfill::new(
            "fetch",
            r#"self.fetch = function fetch(input, init) {
	return new Promise(function (resolve, reject) {
		var request = new XMLHttpRequest();
		init = init || {};
		request.open(init.method || 'GET', String(input), true);
		Object.keys(init.headers || {}).forEach(function (name) { request.setRequestHeader(name, init.headers[name]); });
		request.onload = function () {
			resolve({
				ok: request.status >= 200 && request.status < 300,
				status: request.status,
				text: function () { return Promise.resolve(request.responseText); },
				json: function () { return Promise.resolve(JSON.parse(request.responseText)); }
			});
		};
		request.onerror = function () { reject(new TypeError('Network request failed')); };
		request.send(init.body || null);
	});
};"#,
        )
        .with_detect("'fetch' in self")
        .with_dependencies(["Promise"])
        .with_browser("chrome", below(42))
        .with_browser("edge", below(14))
        .with_browser("firefox", below(39))
        .with_browser("ie", ANY)
        .with_browser("safari", below_minor(10, 1))
        .with_browser("ios_saf", below_minor(10, 3))
        .with_browser("samsung", below(4))
        .with_browser("opera", below(29)),
        Polyfill::new(
            "globalThis",
            r#"(function (global) {
	global.globalThis = global;
}(typeof self !== 'undefined' ? self : this));"#,
        )
        .with_detect("typeof globalThis === 'object'")
        .with_browser("chrome", below(71))
        .with_browser("edge", below(79))
        .with_browser("firefox", below(65))
        .with_browser("ie", ANY)
        .with_browser("safari", below_minor(12, 1))
        .with_browser("ios_saf", below_minor(12, 2))
        .with_browser("opera", below(58)),
        Polyfill::new(
            "queueMicrotask",
            r#"self.queueMicrotask = function queueMicrotask(callback) {
	Promise.resolve().then(callback)['catch'](function (error) {
		setTimeout(function () { throw error; }, 0);
	});
};"#,
        )
        .with_detect("'queueMicrotask' in self")
        .with_dependencies(["Promise"])
        .with_browser("chrome", below(71))
        .with_browser("edge", below(79))
        .with_browser("firefox", below(69))
        .with_browser("ie", ANY)
        .with_browser("safari", below_minor(12, 1))
        .with_browser("ios_saf", below_minor(12, 2))
        .with_browser("opera", below(58)),
    ];

    let aliases = vec![
        (
            "default",
            vec!["es2015", "es2016", "es2017", "fetch", "dom"],
        ),
        ("dom", vec![
            "CustomEvent",
            "Element.prototype.closest",
            "Element.prototype.matches",
            "queueMicrotask",
        ]),
        ("es5", vec!["Array.prototype.indexOf"]),
        ("es6", vec!["es2015"]),
        (
            "es2015",
            vec![
                "Array.from",
                "Array.prototype.find",
                "Map",
                "Object.assign",
                "Promise",
                "Set",
                "String.prototype.includes",
                "String.prototype.startsWith",
                "Symbol",
                "Symbol.iterator",
                "WeakMap",
            ],
        ),
        ("es2016", vec!["Array.prototype.includes"]),
        ("es2017", vec!["Object.entries", "String.prototype.padStart"]),
        ("es2018", vec!["Promise.prototype.finally"]),
        ("es2019", vec!["Array.prototype.flat"]),
    ];

    let catalog = Catalog::new(polyfills, aliases);
    debug_assert!(catalog.validate().is_ok());
    catalog
}
